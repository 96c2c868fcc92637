mod app;
mod entry;
mod logger;

use concprobe::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
