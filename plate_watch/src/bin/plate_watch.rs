//! Runs the recognition loop against the configured camera.
//!
//! Pressing Enter stops the loop and releases the camera. A closed stdin
//! (e.g. `/dev/null` under a service manager) is ignored and the loop keeps
//! running. Ctrl+C terminates the process without the orderly release; the
//! OS reclaims the camera device on exit.

use std::error::Error;
use std::io;
use std::thread;

use env_logger::Env;
use log::{debug, info};

use plate_watch::config::Config;
use plate_watch::metrics;
use plate_watch::plate_detection::classifier::{HttpLookup, PlateClassifier};
use plate_watch::plate_detection::display_sink::{DisplaySink, LogSink};
use plate_watch::plate_detection::indicator_render::IndicatorWindow;
use plate_watch::plate_detection::recognition_loop::{stop_on_enter, RecognitionLoop};
use plate_watch::plate_detection::tesseract_ocr::TesseractOcr;
use plate_watch::plate_detection::text_extractor::TextExtractor;
use plate_watch::plate_detection::video_reader::VideoReader;

fn setup_loop(config: &Config) -> Result<RecognitionLoop, Box<dyn Error>> {
    // Camera or video file
    let source = VideoReader::from_config(config)?;

    // Grayscale OCR restricted to plate characters
    let ocr = TesseractOcr::new(
        config.tesseract_data_path.as_deref(),
        &config.tesseract_language,
    )?;
    let extractor = TextExtractor::with_threshold(Box::new(ocr), config.confidence_threshold);

    // Registry lookup
    let lookup = HttpLookup::new(config.lookup_timeout())?;
    let classifier = PlateClassifier::from_config(Box::new(lookup), config);

    let sink: Box<dyn DisplaySink> = if config.headless {
        Box::new(LogSink::default())
    } else {
        Box::new(IndicatorWindow::new("plate_watch")?)
    };

    Ok(RecognitionLoop::new(
        Box::new(source),
        extractor,
        classifier,
        sink,
        config.cycle_interval(),
    ))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let recognition = setup_loop(&config)?;

    // Only an Enter line stops the loop. Without one the sender has to stay
    // alive, a dropped sender would also end the loop.
    let (shutdown_s, shutdown_r) = crossbeam::channel::bounded(1);
    thread::spawn(move || {
        if !stop_on_enter(io::stdin().lock(), &shutdown_s) {
            loop {
                thread::park();
            }
        }
    });

    info!("Starting, press Enter to stop");
    let state = recognition.run(shutdown_r);
    info!("Done, last state {state:?}");
    debug!("{}", metrics::gather_text());
    Ok(())
}
