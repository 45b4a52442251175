use std::process::exit;

use qpanel::output::console;

fn main() {
    if let Err(e) = qpanel::app::run_cli() {
        console::error(&e);
        exit(1);
    }
}
