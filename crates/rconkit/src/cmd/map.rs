use rconkit_client::query;
use rconkit_telemetry::maps;

use crate::cmd::{connect, MapArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_map, OutputFormat};

pub async fn run(args: MapArgs, format: OutputFormat) -> CliResult<i32> {
    let (client, _events) = connect(&args.conn).await?;

    let body = client
        .send_command(query::MAP)
        .await
        .map_err(|err| client_error("map query failed", err))?;
    let map = maps::lookup(&maps::parse_map_name(&body));
    print_map(&map, format);

    client.disconnect().await;
    Ok(SUCCESS)
}
