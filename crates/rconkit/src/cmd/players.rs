use rconkit_client::query;
use rconkit_telemetry::parse_player_info;

use crate::cmd::{connect, PlayersArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_players, OutputFormat};

pub async fn run(args: PlayersArgs, format: OutputFormat) -> CliResult<i32> {
    let (client, _events) = connect(&args.conn).await?;

    let body = client
        .send_command(query::PLAYER_INFO)
        .await
        .map_err(|err| client_error("player query failed", err))?;
    let players = parse_player_info(&body);
    print_players(&players, format);

    client.disconnect().await;
    Ok(SUCCESS)
}
