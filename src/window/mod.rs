use std::ptr;

use anyhow::{anyhow, ensure, Result};
use ash::{prelude::VkResult, vk};
use glfw::{
    fail_on_errors, Action, ClientApiHint, Glfw, GlfwReceiver, Key, PWindow, WindowEvent,
    WindowHint,
};
use tracing::{debug, trace};

use crate::{config::Config, vulkan::PresentationTarget};

/// Owns GLFW and the one window we present to. Dropping it destroys the window and
/// terminates GLFW, so it has to outlive every Vulkan object.
pub struct WindowManager {
    glfw: Glfw,
    window: PWindow,
    receiver: GlfwReceiver<(f64, WindowEvent)>,
}

impl WindowManager {
    pub fn try_new(config: &Config) -> Result<Self> {
        let mut glfw = glfw::init(fail_on_errors!())?;
        ensure!(
            glfw.vulkan_supported(),
            "GLFW could not find a Vulkan loader"
        );

        // no OpenGL context, Vulkan draws into the window
        glfw.window_hint(WindowHint::ClientApi(ClientApiHint::NoApi));
        glfw.window_hint(WindowHint::Resizable(false));

        let (mut window, events) = glfw
            .create_window(
                config.window_width,
                config.window_height,
                &config.app_name,
                glfw::WindowMode::Windowed,
            )
            .ok_or(anyhow!("Failed to create GLFW window"))?;
        window.set_key_polling(true);
        debug!(
            "Window created ({}x{})",
            config.window_width, config.window_height
        );

        Ok(Self {
            window,
            glfw,
            receiver: events,
        })
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Pumps pending input events. Escape asks the window to close.
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.receiver) {
            trace!("{:?}", event);
            if let WindowEvent::Key(Key::Escape, _, Action::Press, _) = event {
                self.window.set_should_close(true);
            }
        }
    }

    pub fn run_event_loop(&mut self) {
        while !self.should_close() {
            self.poll_events();
        }
    }
}

impl PresentationTarget for WindowManager {
    fn required_instance_extensions(&self) -> Option<Vec<String>> {
        self.glfw.get_required_instance_extensions()
    }

    fn create_surface(&self, instance: vk::Instance) -> VkResult<vk::SurfaceKHR> {
        let mut surface = vk::SurfaceKHR::null();
        self.window
            .create_window_surface(instance, ptr::null(), &mut surface)
            .result()?;
        Ok(surface)
    }
}
