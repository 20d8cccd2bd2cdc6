//! Scroll-tunnel demo: the mouse wheel stands in for page scroll over the
//! pinned region. Scrolling opens the aperture, spreads the glyph rows into
//! the fisheye tunnel, drives the card carousel timing, and closes back up
//! at the end.

use std::sync::Arc;
use std::time::Instant;

use futures::executor::block_on;
use winit::application::ApplicationHandler;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use vitrine::{Carousel, Renderer, Timeline, TunnelConfig, TunnelScene};
use vitrine_test_scenes::{demo_cards, BlockGlyphRasterizer};

/// Pixels of synthetic scroll per wheel line.
const WHEEL_LINE_PX: f32 = 40.0;

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer<'static>>,
    timeline: Timeline,
    carousel: Carousel,
    scroll_offset: f32,
    started: Instant,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("vitrine — tunnel"))
                .expect("to create the window"),
        );
        let size = window.inner_size();

        let mut renderer = block_on(Renderer::new(
            window.clone(),
            (size.width, size.height),
            window.scale_factor(),
            false,
        ))
        .expect("to create the renderer");

        let scene = TunnelScene::new(TunnelConfig::default());
        renderer.set_tunnel_scene(&scene, &BlockGlyphRasterizer::default());

        self.timeline.resize((size.width as f32, size.height as f32));
        self.carousel.resize(size.width as f32);
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
                self.timeline
                    .resize((physical_size.width as f32, physical_size.height as f32));
                self.carousel.resize(physical_size.width as f32);
                window.request_redraw();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_px = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * WHEEL_LINE_PX,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.scroll_offset = (self.scroll_offset - delta_px).max(0.0);
            }
            WindowEvent::RedrawRequested => {
                let u = self.timeline.position_for_scroll(self.scroll_offset);
                let frame = self.timeline.sample(u);

                // The host layout layer would apply these; the demo only
                // exercises that they are produced every frame.
                let _card_transforms =
                    self.carousel.transforms(frame.channels.portfolio_progress);

                if let Some(renderer) = &mut self.renderer {
                    let elapsed = self.started.elapsed().as_secs_f32();
                    renderer.render_tunnel(&frame.channels, elapsed);
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
        timeline: Timeline::new((1280.0, 720.0)),
        carousel: Carousel::new(demo_cards(), 1280.0),
        scroll_offset: 0.0,
        started: Instant::now(),
    };
    let _ = event_loop.run_app(&mut app);
}
