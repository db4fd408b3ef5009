use std::io;

fn main() {
    let stdin = io::stdin();
    let code = bluffpoker_cli::run(
        std::env::args(),
        &mut stdin.lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    );
    std::process::exit(code);
}
