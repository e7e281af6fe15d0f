// Keyboard teleop: 0-9 speed, A/B/W direct slots, P preload, T/L sequences, SPACE stop, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::Duration;
use tracing::info;
use vinebot_zenoh_runtime::config::{DEFAULT_PREFIX, TOPIC_CMD, TOPIC_PEER};
use vinebot_zenoh_runtime::messages::CommandSlot;
use vinebot_zenoh_runtime::protocol::layout::{EIGHT_DIGIT, TWO_DIGIT};

// one selector position: a repeated code would rerun the 13 s sequence
const LIFT_AND_RETURN: u32 = 0x00F0;
const TUNED_DEPLOYMENT: u32 = 0xDDDD;
const STOP: u32 = 0xEEEE;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    // the runtime only services slots while this token is alive
    let _token = session
        .liveliness()
        .declare_token(format!("{DEFAULT_PREFIX}/{TOPIC_PEER}/teleop"))
        .await?;

    info!("Controls: 0-9=speed, A/B/W=all/bases/winches, P=preload, T=deploy, L=lift, SPACE=stop, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&session).await;
    disable_raw_mode()?;

    result
}

async fn send(
    session: &zenoh::Session,
    slot: CommandSlot,
    word: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("{} <- 0x{:04X}", slot, word);
    let key = format!("{DEFAULT_PREFIX}/{TOPIC_CMD}/{}", slot.name());
    session.put(key, word.to_string()).await?;
    Ok(())
}

async fn run_teleop(session: &zenoh::Session) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed: u8 = 5;

    loop {
        if !event::poll(Duration::from_millis(20))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        match code {
            KeyCode::Char(c @ '0'..='9') => {
                speed = c as u8 - b'0';
                info!("Speed index: {}", speed);
            }

            // Direct slots: [selector = 0, speed]
            KeyCode::Char('a') => {
                send(session, CommandSlot::AllMotors, TWO_DIGIT.encode(&[0, speed])?).await?
            }
            KeyCode::Char('b') => {
                send(session, CommandSlot::BaseMotors, TWO_DIGIT.encode(&[0, speed])?).await?
            }
            KeyCode::Char('w') => {
                send(session, CommandSlot::WinchMotors, TWO_DIGIT.encode(&[0, speed])?).await?
            }
            KeyCode::Char('p') => {
                send(session, CommandSlot::PreLoadValues, EIGHT_DIGIT.encode(&[speed; 8])?).await?
            }

            // Sequences
            KeyCode::Char('t') => send(session, CommandSlot::ExecuteCommand, TUNED_DEPLOYMENT).await?,
            KeyCode::Char('l') => send(session, CommandSlot::ExecuteCommand, LIFT_AND_RETURN).await?,
            KeyCode::Char(' ') => send(session, CommandSlot::ExecuteCommand, STOP).await?,

            // Quit
            KeyCode::Char('q') | KeyCode::Esc => break,

            _ => {}
        }
    }

    Ok(())
}
