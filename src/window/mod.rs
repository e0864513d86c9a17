//! Native front end: a scrollable page with the showreel panel in the
//! middle. Stills from the media directory stand in for the video clips.

mod texture_loader;

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use raylib::prelude::*;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::constants::*;
use crate::engine::Showreel;
use crate::error::HostError;
use crate::host::{ObservationHost, Subscription};
use crate::indicator;
use crate::simulate::SimMedia;
use crate::visibility::{RevealTrigger, intersection_ratio};

use texture_loader::load_still;

const WINDOW_WIDTH: i32 = 1280;
const WINDOW_HEIGHT: i32 = 720;
const PAGE_SCREENS: f32 = 3.0;     // Page height in screen heights
const SCROLL_STEP: f32 = 60.0;     // Pixels per wheel notch
const STILL_DURATION: f32 = 4.0;   // How long a still "plays" (seconds)
const CAPTION_FADE: f32 = 1.2;     // Caption entrance (seconds)

struct WindowHost {
    foreground: bool,
    registrations: Rc<Cell<u32>>,
}

struct WindowSubscription {
    registrations: Rc<Cell<u32>>,
    active: bool,
}

impl Subscription for WindowSubscription {
    fn unsubscribe(&mut self) -> Result<(), HostError> {
        if self.active {
            self.active = false;
            self.registrations.set(self.registrations.get().saturating_sub(1));
        }
        Ok(())
    }
}

impl WindowHost {
    fn register(&mut self) -> Box<dyn Subscription> {
        self.registrations.set(self.registrations.get() + 1);
        Box::new(WindowSubscription {
            registrations: Rc::clone(&self.registrations),
            active: true,
        })
    }
}

impl ObservationHost for WindowHost {
    fn observe_intersection(
        &mut self,
        _threshold: f32,
    ) -> Result<Box<dyn Subscription>, HostError> {
        Ok(self.register())
    }

    fn listen_visibility_change(&mut self) -> Result<Box<dyn Subscription>, HostError> {
        Ok(self.register())
    }

    fn is_page_foreground(&self) -> bool {
        self.foreground
    }
}

fn is_foreground(rl: &RaylibHandle) -> bool {
    rl.is_window_focused() && !rl.is_window_minimized()
}

/// Panel position on screen for the given scroll offset.
fn panel_rect(screen_width: f32, screen_height: f32, scroll: f32) -> Rectangle {
    let width = screen_width * 0.6;
    let height = width * 9.0 / 16.0;
    Rectangle::new(
        screen_width * 0.08,
        screen_height * 1.2 - scroll,
        width,
        height,
    )
}

fn fit(texture: &Texture2D, panel: Rectangle) -> Rectangle {
    let scale =
        (panel.width / texture.width() as f32).min(panel.height / texture.height() as f32);
    let width = texture.width() as f32 * scale;
    let height = texture.height() as f32 * scale;
    Rectangle::new(
        panel.x + (panel.width - width) * 0.5,
        panel.y + (panel.height - height) * 0.5,
        width,
        height,
    )
}

fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

pub fn run(dir: &Path, catalog: &Catalog) -> Result<()> {
    let (mut rl, thread) = raylib::init()
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .title("Showreel")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let mut textures: HashMap<String, Texture2D> = HashMap::new();
    for item in &catalog.items {
        match load_still(&mut rl, &thread, Path::new(&item.media_ref)) {
            Ok(Some(texture)) => {
                textures.insert(item.media_ref.clone(), texture);
            }
            Ok(None) => warn!("{} is not a still, showing its title only", item.media_ref),
            Err(e) => warn!("{e}"),
        }
    }
    info!("loaded {} stills from {}", textures.len(), dir.display());

    let media = SimMedia::new(STILL_DURATION);
    let mut host = WindowHost {
        foreground: is_foreground(&rl),
        registrations: Rc::new(Cell::new(0)),
    };
    let items = catalog.items.clone();
    let mut showreel = Showreel::mount(&mut host, media.clone(), items, &catalog.config)
        .map_err(|e| anyhow!("failed to mount showreel: {e}"))?;

    let mut scroll = 0.0f32;
    let mut foreground = host.foreground;
    let mut last_ratio: Option<f32> = None;
    let mut reveal = RevealTrigger::default();
    let mut caption_timer = 0.0f32;

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        let screen_width = rl.get_screen_width() as f32;
        let screen_height = rl.get_screen_height() as f32;

        // --- Host events ---
        let max_scroll = screen_height * (PAGE_SCREENS - 1.0);
        scroll = (scroll - rl.get_mouse_wheel_move() * SCROLL_STEP).clamp(0.0, max_scroll);
        let panel = panel_rect(screen_width, screen_height, scroll);

        let ratio = intersection_ratio(panel.y, panel.height, screen_height);
        if last_ratio != Some(ratio) {
            last_ratio = Some(ratio);
            showreel.on_intersection(ratio);
        }

        let now_foreground = is_foreground(&rl);
        if now_foreground != foreground {
            foreground = now_foreground;
            showreel.on_page_visibility(foreground);
        }

        if reveal.on_scroll(panel.y, screen_height) {
            caption_timer = 0.0;
        }
        if reveal.is_revealed() {
            caption_timer += dt;
        }

        if media.tick(dt) {
            showreel.on_media_finished();
        }

        let mouse = rl.get_mouse_position();
        let clicked = rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT)
            && mouse.x >= panel.x
            && mouse.x <= panel.x + panel.width
            && mouse.y >= panel.y
            && mouse.y <= panel.y + panel.height;
        if clicked {
            if let Some(advance) = showreel.select_next() {
                info!("clicked: {} -> {}", advance.from, advance.to);
            }
        }
        if let Some(advance) = showreel.update(dt) {
            info!("rotated {} -> {} {}", advance.from, advance.to, showreel.indicator());
        }

        // --- Draw ---
        let item = showreel.current_item();
        let caption_alpha = (caption_timer / CAPTION_FADE).min(1.0);
        let opacity = showreel.opacity();

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::WHITE);

        let headline_y = (screen_height * 0.35 - scroll) as i32;
        d.draw_text("Build Secure", (screen_width * 0.08) as i32, headline_y, 72, Color::DARKGRAY);

        d.draw_rectangle_rec(panel, Color::LIGHTGRAY);
        match textures.get(&item.media_ref) {
            Some(texture) => {
                let dest = fit(texture, panel);
                d.draw_texture_pro(
                    texture,
                    Rectangle::new(0.0, 0.0, texture.width() as f32, texture.height() as f32),
                    dest,
                    Vector2::new(0.0, 0.0),
                    0.0,
                    with_alpha(Color::WHITE, opacity),
                );
            }
            None => {
                d.draw_text(
                    &item.media_ref,
                    (panel.x + 20.0) as i32,
                    (panel.y + panel.height * 0.5) as i32,
                    20,
                    with_alpha(Color::DARKGRAY, opacity),
                );
            }
        }

        // Thin bar along the panel's bottom edge while the next item is queued
        if let Some(progress) = showreel.rotation_progress() {
            let bar = Rectangle::new(
                panel.x,
                panel.y + panel.height - 4.0,
                panel.width * progress,
                4.0,
            );
            d.draw_rectangle_rec(bar, Color::DARKGRAY);
        }

        let caption = with_alpha(Color::GRAY, caption_alpha);
        let caption_y = (panel.y - 28.0) as i32;
        let below_y = (panel.y + panel.height + 14.0) as i32;
        let date_x = (panel.x + panel.width - 180.0) as i32;
        d.draw_text(&item.title, panel.x as i32, caption_y, 18, caption);
        d.draw_text(&item.date, date_x, caption_y, 18, caption);
        d.draw_text(&item.description, panel.x as i32, below_y, 18, caption);

        let total = showreel.items().len();
        let dots = indicator::dots(total, showreel.current_index());
        let dots_y = (panel.y + panel.height + 40.0) as i32;
        for (index, active) in dots.into_iter().enumerate() {
            let x = panel.x + panel.width - (total - index) as f32 * 16.0;
            let color = if active { Color::DARKGRAY } else { Color::LIGHTGRAY };
            d.draw_circle(x as i32, dots_y, 4.0, with_alpha(color, caption_alpha));
        }

        if !foreground {
            d.draw_text("paused (window in background)", 10, 10, 16, Color::RED);
        }
    }

    showreel.dispose();
    Ok(())
}
