use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    gcstarget::cli::main().await
}
