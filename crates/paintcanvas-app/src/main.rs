//! Session replay entry point (native).
//!
//! Usage: `paintcanvas <session.json> <out-dir>`

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use paintcanvas_app::{AppResult, DirectoryUploader, Session, SessionReport};
    use std::path::Path;
    use std::process::ExitCode;

    fn run(session: &Path, out_dir: &Path) -> AppResult<SessionReport> {
        let session = Session::load(session)?;
        let mut uploader = DirectoryUploader::new(out_dir)?;
        session.run(&mut uploader)
    }

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [session, out_dir] = args.as_slice() else {
        eprintln!("usage: paintcanvas <session.json> <out-dir>");
        return ExitCode::from(2);
    };

    log::info!("Replaying session {}", session);
    match run(Path::new(session), Path::new(out_dir)) {
        Ok(report) => {
            log::info!(
                "Done: {} entries, step {}, {} uploads",
                report.log_len,
                report.current_step,
                report.uploads
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Session failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
