use rconkit_client::query;
use rconkit_telemetry::parse_game_state;

use crate::cmd::{connect, GamestateArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_game_state, OutputFormat};

pub async fn run(args: GamestateArgs, format: OutputFormat) -> CliResult<i32> {
    let (client, _events) = connect(&args.conn).await?;

    let body = client
        .send_command(query::GAME_STATE)
        .await
        .map_err(|err| client_error("game state query failed", err))?;
    let state = parse_game_state(&body);
    print_game_state(&state, format);

    client.disconnect().await;
    Ok(SUCCESS)
}
