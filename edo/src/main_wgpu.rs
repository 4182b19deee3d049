//! edo GPU (winit + wgpu) entry point.

use edo_assets::Assets;
use edo_core::app::{AppRunner, EventLoopDriver};
use edo_lib::{EdoModel, BACKGROUND, SCREEN_HEIGHT, SCREEN_WIDTH};
use edo_wgpu::{WgpuConfig, WgpuDriver};

const PLACEHOLDER_PATH: &str = "placeholder.png";
const FONT_PATH: &str = "fonts/VictorMono-Regular.ttf";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut assets = Assets::new();
    let placeholder = match assets.load_image(PLACEHOLDER_PATH) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("unable to load {PLACEHOLDER_PATH}: {e}");
            None
        }
    };
    if let Err(e) = assets.load_font(FONT_PATH) {
        log::warn!("unable to load {FONT_PATH}: {e}");
    }

    let model = EdoModel::new(placeholder);
    let driver = WgpuDriver::new(WgpuConfig {
        title: "edo".into(),
        width: SCREEN_WIDTH as u32,
        height: SCREEN_HEIGHT as u32,
        assets,
    });

    let runner = AppRunner::new(Box::new(model), SCREEN_WIDTH, SCREEN_HEIGHT, BACKGROUND);

    if let Err(e) = driver.run(runner) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
