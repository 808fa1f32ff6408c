use std::path::PathBuf;

use gridedit::{config::Config, editor::Editor, logger};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logger::init(&config.log_path(), config.log_level())?;

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut editor = Editor::open(path, config.editor)?;

    let result = editor.run();
    if let Err(e) = &result {
        log::error!("Editor exited with error: {e:#}");
    }
    result
}
