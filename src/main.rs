use anyhow::{Context, Result};
use rusty_triangle::{logging, Config, VulkanContext, WindowManager};
use tracing::info;

fn main() -> Result<()> {
    logging::init()?;

    let config = Config::default();
    let mut app = App::new(&config)?;
    app.run();

    Ok(())
}

struct App {
    /// The Vulkan handles, released before the window
    context: Option<VulkanContext>,
    /// The actual window presented to the user. Vulkan presents to it, so
    /// it has to outlive the context
    window: WindowManager,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let window = WindowManager::try_new(config)?;
        let context =
            VulkanContext::new(config, &window).context("Failed to initialise Vulkan")?;
        Ok(Self {
            context: Some(context),
            window,
        })
    }

    pub fn run(&mut self) {
        self.window.run_event_loop();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        info!("Window closed, shutting down");
        self.context = None;
    }
}
