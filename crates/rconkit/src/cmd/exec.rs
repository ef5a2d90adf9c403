use crate::cmd::{connect, ExecArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_response, OutputFormat};

pub async fn run(args: ExecArgs, format: OutputFormat) -> CliResult<i32> {
    let (client, _events) = connect(&args.conn).await?;

    let response = client
        .send_command(&args.command)
        .await
        .map_err(|err| client_error("command failed", err))?;
    print_response(&response, format);

    client.disconnect().await;
    Ok(SUCCESS)
}
