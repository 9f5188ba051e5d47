//! Terminal input and frame pacing.
//!
//! One background task turns crossterm input into dashboard [`Event`]s and
//! interleaves them with the animation tick and the frame clock. Resizes
//! need no event of their own: the next frame is laid out at the new size.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Pointer moved or dragged; drives the chart hover readout.
    Mouse(MouseEvent),
    /// Animation step: spinners, chart reveal, status age.
    Tick,
    /// Time to draw a frame.
    Render,
}

/// How often the dashboard animates and redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub tick: Duration,
    pub frame: Duration,
}

impl Cadence {
    /// `tick_ms` between animation steps, `fps` frames per second.
    pub fn new(tick_ms: u64, fps: u16) -> Self {
        Self {
            tick: Duration::from_millis(tick_ms.max(1)),
            frame: Duration::from_secs(1) / u32::from(fps.max(1)),
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(250, 30)
    }
}

/// Keep key presses and pointer motion. Releases, repeats, clicks, scrolls,
/// focus changes, pastes and resizes are dropped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
            Some(Event::Mouse(mouse))
        }
        _ => None,
    }
}

fn clock(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Pump input and clock events into `tx` until `cancel` fires or the
/// receiver goes away.
pub fn spawn_event_pump(cadence: Cadence, tx: mpsc::UnboundedSender<Event>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut input = EventStream::new();
        let mut tick = clock(cadence.tick);
        let mut frame = clock(cadence.frame);

        loop {
            let event = tokio::select! {
                () = cancel.cancelled() => break,
                _ = tick.tick() => Event::Tick,
                _ = frame.tick() => Event::Render,
                next = input.next() => match next {
                    Some(Ok(raw)) => match translate(raw) {
                        Some(event) => event,
                        None => continue,
                    },
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input error");
                        continue;
                    }
                    None => break,
                },
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseButton};

    use super::*;

    fn key(kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('r'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind) -> CrosstermEvent {
        CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: 10,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn only_presses_and_pointer_motion_pass() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(Event::Key(_))));
        assert!(translate(key(KeyEventKind::Release)).is_none());
        assert!(translate(key(KeyEventKind::Repeat)).is_none());

        assert!(matches!(translate(mouse(MouseEventKind::Moved)), Some(Event::Mouse(_))));
        assert!(matches!(
            translate(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(Event::Mouse(_))
        ));
        assert!(translate(mouse(MouseEventKind::ScrollDown)).is_none());
        assert!(translate(mouse(MouseEventKind::Down(MouseButton::Left))).is_none());

        assert!(translate(CrosstermEvent::Resize(120, 40)).is_none());
        assert!(translate(CrosstermEvent::FocusGained).is_none());
    }

    #[test]
    fn cadence_from_settings() {
        let c = Cadence::new(250, 30);
        assert_eq!(c.tick, Duration::from_millis(250));
        assert_eq!(c.frame, Duration::from_nanos(33_333_333));
        assert_eq!(Cadence::default(), c);

        // zeros are clamped instead of spinning
        let c = Cadence::new(0, 0);
        assert_eq!(c.tick, Duration::from_millis(1));
        assert_eq!(c.frame, Duration::from_secs(1));
    }
}
