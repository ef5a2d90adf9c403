use tracing::{info, warn};

use rconkit_client::ClientEvent;

use crate::cmd::{connect, parse_duration, WatchArgs};
use crate::exit::{CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_snapshot, OutputFormat};

/// Periodic combined refresh of players, map and game state.
///
/// The typed queries degrade to safe defaults on individual failures, so a
/// flaky round-trip shows up as an empty snapshot rather than killing the
/// loop. The loop only stops on Ctrl-C, `--count`, or reconnect
/// exhaustion.
pub async fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let (client, mut events) = connect(&args.conn).await?;

    let mut ticker = tokio::time::interval(interval);
    let mut refreshes = 0usize;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (players, map, state) = tokio::join!(
                    client.get_player_info(),
                    client.get_current_map(),
                    client.get_game_state(),
                );
                print_snapshot(&players, &map, &state, format);
                refreshes += 1;
                if args.count.is_some_and(|count| refreshes >= count) {
                    break;
                }
            }
            event = events.recv() => match event {
                Some(ClientEvent::ReconnectExhausted { attempts }) => {
                    return Err(CliError::new(
                        FAILURE,
                        format!("gave up reconnecting after {attempts} attempts"),
                    ));
                }
                Some(event) => info!(?event, "connection event"),
                None => return Err(CliError::new(FAILURE, "connection task stopped")),
            },
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    warn!(error = %err, "ctrl-c handler failed");
                }
                break;
            }
        }
    }

    client.disconnect().await;
    Ok(SUCCESS)
}
