//! # linkflip
//!
//! Headless front end over the command layer. Every invocation loads the
//! stored profile, applies one command, prints the result and waits for the
//! save to land.

use anyhow::{anyhow, bail, Context};
use tracing::info;

use linkflip_client::commands::code::CodeFormat;
use linkflip_client::commands::{broadcast, cards, code, profile, settings};
use linkflip_client::{bootstrap, init_tracing, AppState, ClientConfig};

const USAGE: &str = "\
usage: linkflip <command>

  show                       print the profile and its cards
  add <url>                  add a card for a profile link
  remove <id>                delete a card
  move <id> <position>       move a card (0 is first)
  name <text>                set the profile name
  bio <text>                 set the profile bio
  code <id> [svg|png|text]   print the code for a card
  flip <id>                  show a card's code until it turns back
  scheme <light|dark|system> set the colour scheme
  broadcast <on|off>         toggle contactless broadcast
  reset                      erase everything";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");
    let mut state = bootstrap(&config).await;

    let result = run(&mut state, command, rest).await;
    state.flush().await;
    result
}

async fn run(state: &mut AppState, command: &str, rest: &[String]) -> anyhow::Result<()> {
    match command {
        "show" => print_json(&profile::get_profile(state).map_err(|e| anyhow!(e))?)?,
        "add" => {
            let card = cards::add_card(state, arg(rest, 0, "url")?).map_err(|e| anyhow!(e))?;
            print_json(&card)?;
        }
        "remove" => cards::remove_card(state, arg(rest, 0, "id")?).map_err(|e| anyhow!(e))?,
        "move" => {
            let position: u32 = arg(rest, 1, "position")?
                .parse()
                .context("position must be a number")?;
            let ordered =
                cards::move_card(state, arg(rest, 0, "id")?, position).map_err(|e| anyhow!(e))?;
            print_json(&ordered)?;
        }
        "name" => profile::set_name(state, &rest.join(" ")).map_err(|e| anyhow!(e))?,
        "bio" => profile::set_bio(state, &rest.join(" ")).map_err(|e| anyhow!(e))?,
        "code" => {
            let format = match rest.get(1) {
                Some(f) => f.parse::<CodeFormat>().map_err(|e| anyhow!(e))?,
                None => CodeFormat::Terminal,
            };
            let output =
                code::card_code(state, arg(rest, 0, "id")?, format).map_err(|e| anyhow!(e))?;
            println!("{output}");
        }
        "flip" => {
            let id = arg(rest, 0, "id")?;
            let output =
                code::card_code(state, id, CodeFormat::Terminal).map_err(|e| anyhow!(e))?;
            code::flip_card(state, id).map_err(|e| anyhow!(e))?;
            state.settle_broadcast().await;
            println!("{output}");
            print_json(&broadcast::broadcast_status(state).map_err(|e| anyhow!(e))?)?;

            if state.next_auto_revert().await.is_some() {
                state.settle_broadcast().await;
                println!("card turned back");
            }
        }
        "scheme" => {
            let view = settings::set_color_scheme(state, arg(rest, 0, "scheme")?)
                .map_err(|e| anyhow!(e))?;
            print_json(&view)?;
        }
        "broadcast" => {
            let enabled = match arg(rest, 0, "on|off")? {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                other => bail!("expected on or off, got {other}"),
            };
            broadcast::set_broadcast(state, enabled).map_err(|e| anyhow!(e))?;
            state.settle_broadcast().await;
            print_json(&broadcast::broadcast_status(state).map_err(|e| anyhow!(e))?)?;
        }
        "reset" => settings::reset_all(state).await.map_err(|e| anyhow!(e))?,
        other => bail!("unknown command {other}\n\n{USAGE}"),
    }
    Ok(())
}

fn arg<'a>(rest: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    rest.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <{name}>\n\n{USAGE}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
