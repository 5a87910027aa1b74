#![allow(missing_docs)]
//! Host-level tests for the controller: dedup, shadow commits, preparing, and inbound dispatch.

use launchpad_envoy::protocol::{CONTROL_CHANGE, NOTE_OFF, NOTE_ON};
use launchpad_envoy::{
    ButtonAction, ButtonHandler, ButtonQueue, Color, Error, Grid, GridView, Launchpad,
    MessagePort, SharedLaunchpad, ShortMessage, TestBrightness, TransportError,
};

/// Records every message; fails every send while `failing` is set.
#[derive(Default)]
struct RecordingPort {
    sent: Vec<[u8; 3]>,
    attempts: usize,
    failing: bool,
}

impl MessagePort for RecordingPort {
    fn send(&mut self, message: ShortMessage) -> Result<(), TransportError> {
        self.attempts += 1;
        if self.failing {
            return Err(TransportError);
        }
        self.sent.push(message.to_bytes());
        Ok(())
    }
}

#[derive(Default)]
struct PressLog {
    pressed: Vec<(i32, i32)>,
    released: Vec<(i32, i32)>,
}

impl ButtonHandler for PressLog {
    fn pressed(&mut self, row: i32, column: i32) {
        self.pressed.push((row, column));
    }

    fn released(&mut self, row: i32, column: i32) {
        self.released.push((row, column));
    }
}

fn launchpad() -> Launchpad<RecordingPort> {
    Launchpad::new(RecordingPort::default(), ())
}

fn sent(launchpad: &Launchpad<RecordingPort>) -> &[[u8; 3]] {
    &launchpad.port().sent
}

#[test]
fn turn_on_twice_sends_once() {
    let mut launchpad = launchpad();
    launchpad.turn_on(2, 3, Color::STRONG_RED).unwrap();
    launchpad.turn_on(2, 3, Color::STRONG_RED).unwrap();
    assert_eq!(sent(&launchpad), &[[NOTE_ON, 0x23, 15]]);
    assert_eq!(launchpad.get_button(2, 3), Ok(Color::STRONG_RED));

    launchpad.turn_on(2, 3, Color::WEAK_RED).unwrap();
    assert_eq!(sent(&launchpad).len(), 2);
}

#[test]
fn top_row_uses_control_change_for_on_and_off() {
    let mut launchpad = launchpad();
    launchpad.turn_on(-1, 4, Color::STRONG_GREEN).unwrap();
    launchpad.turn_off(-1, 4).unwrap();
    assert_eq!(
        sent(&launchpad),
        &[[CONTROL_CHANGE, 108, 60], [CONTROL_CHANGE, 108, 0]]
    );
}

#[test]
fn turn_off_when_off_sends_nothing() {
    let mut launchpad = launchpad();
    launchpad.turn_off(0, 0).unwrap();
    assert!(sent(&launchpad).is_empty());

    launchpad.turn_on(0, 0, Color::WEAK_GREEN).unwrap();
    launchpad.turn_off(0, 0).unwrap();
    launchpad.turn_off(0, 0).unwrap();
    assert_eq!(sent(&launchpad), &[[NOTE_ON, 0, 28], [NOTE_OFF, 0, 0]]);
    assert_eq!(launchpad.get_button(0, 0), Ok(Color::OFF));
}

#[test]
fn out_of_bounds_is_ignored_only_by_turn_off() {
    let mut launchpad = launchpad();
    for (row, column) in [(-1, 8), (8, 0), (0, 9), (-2, 0)] {
        assert_eq!(launchpad.turn_off(row, column), Ok(()));
        assert_eq!(
            launchpad.turn_on(row, column, Color::STRONG_RED),
            Err(Error::OutOfBounds { row, column })
        );
        assert_eq!(
            launchpad.get_button(row, column),
            Err(Error::OutOfBounds { row, column })
        );
    }
    assert!(sent(&launchpad).is_empty());
}

#[test]
fn turn_on_with_off_turns_off() {
    let mut launchpad = launchpad();
    launchpad.turn_on(5, 8, Color::MEDIUM_ORANGE).unwrap();
    launchpad.turn_on(5, 8, Color::OFF).unwrap();
    assert_eq!(sent(&launchpad)[1], [NOTE_OFF, 0x58, 0]);
}

#[test]
fn negative_colors_are_rejected() {
    let mut launchpad = launchpad();
    assert!(matches!(
        launchpad.turn_on(0, 0, Color(-5)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(sent(&launchpad).is_empty());
}

#[test]
fn transport_failure_leaves_shadow_untouched() {
    let mut launchpad = launchpad();
    launchpad.turn_on(1, 1, Color::WEAK_RED).unwrap();
    launchpad.port_mut().failing = true;

    assert_eq!(
        launchpad.turn_on(1, 1, Color::STRONG_RED),
        Err(Error::Transport(TransportError))
    );
    assert_eq!(launchpad.get_button(1, 1), Ok(Color::WEAK_RED));
    assert_eq!(launchpad.turn_off(1, 1), Err(Error::Transport(TransportError)));
    assert_eq!(launchpad.get_button(1, 1), Ok(Color::WEAK_RED));
    assert_eq!(launchpad.reset(), Err(Error::Transport(TransportError)));
    assert_eq!(launchpad.get_button(1, 1), Ok(Color::WEAK_RED));

    // Dedup still applies: nothing to send, so nothing fails.
    assert_eq!(launchpad.turn_on(1, 1, Color::WEAK_RED), Ok(()));

    launchpad.port_mut().failing = false;
    launchpad.turn_off(1, 1).unwrap();
    assert_eq!(launchpad.get_button(1, 1), Ok(Color::OFF));
}

#[test]
fn replace_erases_but_turn_on_view_does_not() {
    let mut launchpad = launchpad();
    let lit = Grid::filled(3, 3, Color::STRONG_RED).unwrap();
    launchpad.turn_on_view(&GridView::new(&lit)).unwrap();
    assert_eq!(sent(&launchpad).len(), 9);

    let blank = Grid::new(3, 3).unwrap();
    launchpad.turn_on_view(&GridView::new(&blank)).unwrap();
    assert_eq!(sent(&launchpad).len(), 9);
    assert_eq!(launchpad.get_button(2, 2), Ok(Color::STRONG_RED));

    launchpad.replace(&GridView::new(&blank)).unwrap();
    assert_eq!(sent(&launchpad).len(), 18);
    assert!(launchpad.grid().cells().all(|cell| cell.color.is_off()));
}

#[test]
fn turn_off_view_only_touches_lit_cells() {
    let mut launchpad = launchpad();
    launchpad.turn_on(0, 0, Color::WEAK_RED).unwrap();
    launchpad.turn_on(0, 1, Color::WEAK_RED).unwrap();

    let mut mask = Grid::new(2, 1).unwrap();
    mask.set(0, 1, Color::NOT_DEFINED).unwrap();
    launchpad.turn_off_view(&GridView::new(&mask)).unwrap();
    assert_eq!(launchpad.get_button(0, 0), Ok(Color::WEAK_RED));
    assert_eq!(launchpad.get_button(0, 1), Ok(Color::OFF));
}

#[test]
fn view_out_of_range_stops_at_first_error() {
    let mut launchpad = launchpad();
    let grid = Grid::filled(2, 1, Color::WEAK_GREEN).unwrap();
    let view = GridView::at(&grid, 0, 8);
    assert_eq!(
        launchpad.turn_on_view(&view),
        Err(Error::OutOfBounds { row: 0, column: 9 })
    );
    assert_eq!(launchpad.get_button(0, 8), Ok(Color::WEAK_GREEN));
}

#[test]
fn nested_preparing_flushes_net_changes_once() {
    let mut launchpad = launchpad();
    launchpad.turn_on(0, 0, Color::STRONG_RED).unwrap();
    launchpad.turn_on(7, 7, Color::STRONG_GREEN).unwrap();
    let before = sent(&launchpad).len();

    launchpad.set_preparing(true).unwrap();
    launchpad.set_preparing(true).unwrap();
    // Changed and then changed back: not a net change.
    launchpad.turn_on(0, 0, Color::WEAK_RED).unwrap();
    launchpad.turn_on(0, 0, Color::STRONG_RED).unwrap();
    // Net changes.
    launchpad.turn_off(7, 7).unwrap();
    launchpad.turn_on(-1, 0, Color::MEDIUM_YELLOW).unwrap();
    launchpad.turn_on(4, 8, Color::LIME_1).unwrap();

    launchpad.set_preparing(false).unwrap();
    assert!(launchpad.is_preparing());
    assert_eq!(launchpad.preparing_depth(), 1);
    assert_eq!(sent(&launchpad).len(), before);
    // The shadow is untouched while preparing.
    assert_eq!(launchpad.get_button(7, 7), Ok(Color::STRONG_GREEN));

    launchpad.set_preparing(false).unwrap();
    assert!(!launchpad.is_preparing());
    assert_eq!(sent(&launchpad).len(), before + 3);
    assert_eq!(launchpad.get_button(7, 7), Ok(Color::OFF));
    assert_eq!(launchpad.get_button(-1, 0), Ok(Color::MEDIUM_YELLOW));
    assert_eq!(launchpad.get_button(4, 8), Ok(Color::LIME_1));
    assert_eq!(launchpad.get_button(0, 0), Ok(Color::STRONG_RED));
}

#[test]
fn leaving_preparing_when_idle_is_illegal() {
    let mut launchpad = launchpad();
    assert!(matches!(
        launchpad.set_preparing(false),
        Err(Error::IllegalState(_))
    ));
    assert_eq!(launchpad.preparing_depth(), 0);
}

#[test]
fn prepare_leaves_even_on_error() {
    let mut launchpad = launchpad();
    let result: Result<(), Error> = launchpad.prepare(|launchpad| {
        launchpad.turn_on(1, 1, Color::MEDIUM_GREEN)?;
        launchpad.turn_on(9, 9, Color::MEDIUM_GREEN)
    });
    assert_eq!(result, Err(Error::OutOfBounds { row: 9, column: 9 }));
    assert!(!launchpad.is_preparing());
    assert_eq!(launchpad.get_button(1, 1), Ok(Color::MEDIUM_GREEN));
    assert_eq!(sent(&launchpad).len(), 1);
}

#[test]
fn flush_attempts_every_change() {
    let mut launchpad = launchpad();
    launchpad.set_preparing(true).unwrap();
    launchpad.turn_on(0, 0, Color::WEAK_RED).unwrap();
    launchpad.turn_on(0, 1, Color::WEAK_RED).unwrap();
    launchpad.port_mut().failing = true;

    assert_eq!(
        launchpad.set_preparing(false),
        Err(Error::Transport(TransportError))
    );
    assert!(!launchpad.is_preparing());
    assert_eq!(launchpad.port().attempts, 2);
    assert_eq!(launchpad.get_button(0, 0), Ok(Color::OFF));
    assert_eq!(launchpad.get_button(0, 1), Ok(Color::OFF));
}

#[test]
fn reset_and_clear() {
    let mut launchpad = launchpad();
    launchpad.turn_on(0, 0, Color::STRONG_RED).unwrap();
    launchpad.turn_on(-1, 7, Color::STRONG_RED).unwrap();

    launchpad.clear().unwrap();
    assert_eq!(
        &sent(&launchpad)[2..],
        &[[CONTROL_CHANGE, 111, 0], [NOTE_OFF, 0, 0]]
    );

    launchpad.turn_on(6, 6, Color::WEAK_YELLOW).unwrap();
    launchpad.reset().unwrap();
    assert_eq!(sent(&launchpad).last(), Some(&[CONTROL_CHANGE, 0, 0]));
    assert_eq!(launchpad.get_button(6, 6), Ok(Color::OFF));
}

#[test]
fn open_and_close_reset_the_device() {
    let launchpad = Launchpad::open(RecordingPort::default(), ()).unwrap();
    assert_eq!(sent(&launchpad), &[[CONTROL_CHANGE, 0, 0]]);
    let port = launchpad.close().unwrap();
    assert_eq!(port.sent.len(), 2);
}

#[test]
fn light_test_fills_shadow() {
    let mut launchpad = launchpad();
    launchpad.light_test(TestBrightness::Medium).unwrap();
    assert_eq!(sent(&launchpad), &[[CONTROL_CHANGE, 0, 126]]);
    let amber = Color::new(2, 2).unwrap();
    assert_eq!(launchpad.get_button(3, 4), Ok(amber));
    assert_eq!(launchpad.get_button(-1, 0), Ok(amber));

    launchpad.light_test(TestBrightness::Full).unwrap();
    assert_eq!(sent(&launchpad).last(), Some(&[CONTROL_CHANGE, 0, 127]));
}

#[test]
fn light_test_while_preparing_survives_the_flush() {
    let mut launchpad = launchpad();
    launchpad.set_preparing(true).unwrap();
    launchpad.light_test(TestBrightness::Low).unwrap();
    launchpad.turn_on(2, 2, Color::STRONG_RED).unwrap();
    launchpad.set_preparing(false).unwrap();

    assert_eq!(
        sent(&launchpad),
        &[[CONTROL_CHANGE, 0, 125], [NOTE_ON, 0x22, 15]]
    );
    let amber = Color::new(1, 1).unwrap();
    assert_eq!(launchpad.get_button(0, 0), Ok(amber));
    assert_eq!(launchpad.get_button(-1, 7), Ok(amber));
    assert_eq!(launchpad.get_button(2, 2), Ok(Color::STRONG_RED));
}

#[test]
fn duty_cycle_is_sent() {
    let mut launchpad = launchpad();
    launchpad.set_duty_cycle(9, 3).unwrap();
    launchpad.set_duty_cycle(1, 3).unwrap();
    assert_eq!(
        sent(&launchpad),
        &[[CONTROL_CHANGE, 0x1F, 0], [CONTROL_CHANGE, 0x1E, 0]]
    );
    assert!(launchpad.set_duty_cycle(17, 3).is_err());
}

#[test]
fn grid_copies_shadow() {
    let mut launchpad = launchpad();
    launchpad.turn_on(0, 0, Color::STRONG_RED).unwrap();
    launchpad.turn_on(0, 8, Color::WEAK_RED).unwrap();
    launchpad.turn_on(-1, 2, Color::WEAK_GREEN).unwrap();

    let main = launchpad.grid();
    assert_eq!((main.width(), main.height()), (8, 8));
    assert_eq!(main.get(0, 0), Ok(Color::STRONG_RED));
    assert_eq!(main.cells().filter(|cell| !cell.color.is_off()).count(), 1);

    launchpad.light_test(TestBrightness::Low).unwrap();
    let full = launchpad.full_grid();
    assert_eq!((full.width(), full.height()), (9, 9));
    assert_eq!(full.get(0, 8), Ok(Color::OFF));
    assert_eq!(full.get(1, 8), Ok(Color::new(1, 1).unwrap()));
    assert_eq!(full.get(0, 7), Ok(Color::new(1, 1).unwrap()));

    let main = launchpad.grid();
    assert!(main.cells().all(|cell| cell.color == Color::new(1, 1).unwrap()));
    assert_eq!(main.to_string().lines().count(), 8);
}

#[test]
fn inbound_messages_reach_the_handler() {
    let mut launchpad = Launchpad::new(RecordingPort::default(), PressLog::default());
    let press = ShortMessage::new(NOTE_ON, 0x12, 127).unwrap();
    let release = ShortMessage::new(NOTE_ON, 0x12, 0).unwrap();
    let top = ShortMessage::new(CONTROL_CHANGE, 104, 127).unwrap();
    let bogus = ShortMessage::new(CONTROL_CHANGE, 0, 127).unwrap();

    assert_eq!(
        launchpad.receive(press, 10).map(|event| event.action),
        Some(ButtonAction::Pressed)
    );
    launchpad.receive(release, 20);
    launchpad.receive(top, -1);
    assert_eq!(launchpad.receive(bogus, -1), None);
    assert_eq!(launchpad.receive_bytes([0x12, 0, 0], -1), None);

    assert_eq!(launchpad.handler().pressed, vec![(1, 2), (-1, 0)]);
    assert_eq!(launchpad.handler().released, vec![(1, 2)]);
}

#[test]
fn button_queue_keeps_latest_events() {
    let mut launchpad = Launchpad::new(RecordingPort::default(), ButtonQueue::<2>::new());
    for code in 0..3 {
        launchpad.receive_bytes([NOTE_ON, code, 127], -1);
    }
    let queue = launchpad.handler_mut();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop().map(|event| event.column), Some(1));
    assert_eq!(queue.pop().map(|event| event.column), Some(2));
    assert!(queue.is_empty());
}

#[test]
fn shared_launchpad_serializes_access() {
    let shared = SharedLaunchpad::new(Launchpad::new(RecordingPort::default(), PressLog::default()));
    shared
        .lock(|launchpad| launchpad.turn_on(2, 2, Color::STRONG_ORANGE))
        .unwrap();
    let event = shared
        .receive(ShortMessage::new(NOTE_ON, 0x22, 127).unwrap(), -1)
        .unwrap();
    assert_eq!(event.map(|event| (event.row, event.column)), Some((2, 2)));

    let nested = shared.lock(|_| shared.lock(|_| Ok(())));
    assert!(matches!(nested, Err(Error::IllegalState(_))));

    let launchpad = shared.into_inner();
    assert_eq!(launchpad.handler().pressed, vec![(2, 2)]);
    assert_eq!(launchpad.port().sent, vec![[NOTE_ON, 0x22, 31]]);
}
