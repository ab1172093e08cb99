use log::debug;
use redpipe::Connection;
use redpipe::config;
use redpipe::config::Cli;
use redpipe::config::Parser;
use redpipe::format::format_reply;
use redpipe::format::infer_kind;
use resp::Command;
use resp::ReplyKind;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();
	let config = config::load(&cli)?;
	telemetry::init(&config.log_level)?;

	let mut commands = Vec::new();
	let mut kinds: Vec<ReplyKind> = Vec::new();
	for words in cli.command_words() {
		commands.push(Command::new(words)?);
		kinds.push(infer_kind(&words[0]));
	}
	let command = Command::pipeline(commands)?;
	debug!("Expecting replies {:?}", kinds);

	let mut conn = Connection::connect(&config).await?;
	let outcome = conn.execute_pipeline(&command, &kinds).await;
	conn.dispose().await;

	match outcome {
		Ok(replies) => {
			for reply in &replies {
				println!("{}", format_reply(reply));
			}
			Ok(())
		}
		Err(e) => {
			println!("(error) {}", e);
			std::process::exit(1);
		}
	}
}
