//! Interactive particle-field demo: move the pointer to push particles
//! around, stop to watch them spring back.

use std::sync::Arc;
use std::time::Instant;

use futures::executor::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use vitrine::{BandConfig, FieldEngine, Renderer};

fn logical_size(physical: PhysicalSize<u32>, scale_factor: f64) -> (f32, f32) {
    (
        (physical.width as f64 / scale_factor) as f32,
        (physical.height as f64 / scale_factor) as f32,
    )
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer<'static>>,
    field: FieldEngine,
    scale_factor: f64,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("vitrine — field"))
                .expect("to create the window"),
        );
        let size = window.inner_size();
        self.scale_factor = window.scale_factor();

        let renderer = block_on(Renderer::new(
            window.clone(),
            (size.width, size.height),
            self.scale_factor,
            false,
        ))
        .expect("to create the renderer");

        self.field.resize(logical_size(size, self.scale_factor));
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = &self.window else { return };
        if window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((physical_size.width, physical_size.height));
                }
                self.field
                    .resize(logical_size(physical_size, self.scale_factor));
                window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.field.pointer_moved(
                    (
                        (position.x / self.scale_factor) as f32,
                        (position.y / self.scale_factor) as f32,
                    ),
                    Instant::now(),
                );
            }
            WindowEvent::RedrawRequested => {
                self.field.update(Instant::now());
                if let Some(renderer) = &mut self.renderer {
                    renderer.add_shapes(self.field.draw_list());
                    renderer.render_shapes();
                }
                window.request_redraw();
            }
            _ => {}
        }
    }
}

pub fn main() {
    env_logger::init();
    let event_loop = EventLoop::new().expect("to create the event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        renderer: None,
        field: FieldEngine::band(BandConfig::default()),
        scale_factor: 1.0,
    };
    let _ = event_loop.run_app(&mut app);
}
