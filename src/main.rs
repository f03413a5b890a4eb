//! Skate Race entry point
//!
//! The browser build is driven from JS through `platform::web::WebApp`. The
//! native binary runs one game headless and prints the result:
//!
//! ```text
//! skate-race [GAME_ID] [calm|classic|chaos|path/to/tuning.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(message) = native::run(std::env::args().skip(1).collect()) {
        eprintln!("error: {}", message);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use skate_race::lobby::Lobby;
    use skate_race::sim::FrameInput;
    use skate_race::tuning::TuningPreset;
    use skate_race::view::{FrameView, RaceView};
    use skate_race::{App, RaceTuning, UiAction};

    /// Simulated frame length (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Ten simulated minutes at 60 fps
    const MAX_FRAMES: usize = 36_000;
    const DEFAULT_GAME: u32 = 106;

    pub fn run(args: Vec<String>) -> Result<(), String> {
        let game_id = match args.first() {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| format!("invalid game id: {}", raw))?,
            None => DEFAULT_GAME,
        };
        let tuning = load_tuning(args.get(1).map(String::as_str))?;

        log::info!("Skate Race (native) starting...");
        let mut app = App::new(Lobby::new(), tuning);

        for action in [
            UiAction::SelectGame { game_id },
            UiAction::FinalizeGame,
            UiAction::StartRace,
        ] {
            let response = app.handle(action).map_err(|e| e.to_string())?;
            if let Some(notice) = response.notice {
                println!("{}", notice.message);
            }
        }

        if app.race().is_none() {
            return Err(format!("game {} cannot be raced", game_id));
        }
        if let Some(game) = app.lobby().game(game_id) {
            if let Some(seed) = game.resolved_seed() {
                println!("Game {}: seed {}", game_id, seed.to_hex());
            }
        }

        let mut now = 0.0;
        for _ in 0..MAX_FRAMES {
            if app.race().is_none_or(|r| r.is_finished()) {
                break;
            }
            now += FRAME_MS;
            app.update(FrameInput::new(now, FRAME_MS));
        }

        match app.view() {
            FrameView::Race(view) => print_result(&view),
            FrameView::Lobby(_) => return Err("race scene was lost".to_string()),
        }
        Ok(())
    }

    fn load_tuning(arg: Option<&str>) -> Result<RaceTuning, String> {
        let Some(arg) = arg else {
            return Ok(RaceTuning::default());
        };
        if let Some(preset) = TuningPreset::parse(arg) {
            log::info!("Tuning preset: {}", preset.as_str());
            return Ok(RaceTuning::from_preset(preset));
        }
        let json = std::fs::read_to_string(arg).map_err(|e| format!("{}: {}", arg, e))?;
        RaceTuning::from_json(&json).map_err(|e| e.to_string())
    }

    fn print_result(view: &RaceView) {
        println!();
        println!("{}", view.scoreboard_header);
        for row in &view.scoreboard {
            println!("{}", row.text);
        }
        println!();
        println!("Time: {}", view.timer);
        println!("{}", view.status);
        if let Some(line) = &view.win_loss {
            println!("{}", line.text);
        }
    }
}
