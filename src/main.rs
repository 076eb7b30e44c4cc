use std::process;

fn main() {
    match nws::run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}
