use clap::Parser;

use beeref::cli::CommandlineArgs;
use beeref::logger::{self, LogLevel};
use beeref::BeeRefApp;

fn main() -> Result<(), eframe::Error> {
    let args = CommandlineArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init(LogLevel::from_str(&args.loglevel));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("BeeRef"),
        ..Default::default()
    };

    eframe::run_native(
        "BeeRef",
        options,
        Box::new(move |cc| Box::new(BeeRefApp::new(cc, args.filename))),
    )
}
