//! Keyboard input dispatch: overlays, then global keys, then sidebar controls.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Overlay, Tab};

const SCROLL_STEP: u16 = 5;

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Edit(_) => {
            handle_edit_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(tab) = Tab::from_index(c as usize - '1' as usize) {
                app.select_tab(tab);
            }
        }
        KeyCode::Tab => app.select_tab(app.active_tab.next()),
        KeyCode::BackTab => app.select_tab(app.active_tab.prev()),
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
        }
        KeyCode::Char('r') => app.submit(),
        KeyCode::Char('x') => app.export(),
        KeyCode::PageDown => app.scroll = app.scroll.saturating_add(SCROLL_STEP),
        KeyCode::PageUp => app.scroll = app.scroll.saturating_sub(SCROLL_STEP),

        // 3. Sidebar controls.
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('h') | KeyCode::Left => {
            if app.adjust(-1) {
                app.submit();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.adjust(1) {
                app.submit();
            }
        }
        KeyCode::Enter => {
            if app.begin_edit() {
                app.submit();
            }
        }
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_edit_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.overlay = Overlay::None,
        KeyCode::Enter => {
            if app.commit_edit() {
                app.submit();
            }
        }
        KeyCode::Backspace => {
            if let Overlay::Edit(edit) = &mut app.overlay {
                edit.buffer.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Overlay::Edit(edit) = &mut app.overlay {
                edit.buffer.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crate::app::Control;
    use crate::worker::WorkerCommand;

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn number_keys_select_tabs() {
        let (mut app, _rx, _tx) = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.active_tab, Tab::Indicators);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_tab, Tab::News);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.active_tab, Tab::Indicators);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.active_tab, Tab::Indicators);
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let (mut app, _rx, _tx) = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.overlay, Overlay::Help);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.overlay, Overlay::None);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn ticker_edit_submits_render() {
        let (mut app, rx, _tx) = test_app();
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.overlay, Overlay::Edit(_)));
        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "msft");
        press(&mut app, KeyCode::Enter);

        match rx.try_recv().unwrap() {
            WorkerCommand::Render { request } => assert_eq!(request.ticker, "MSFT"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn escape_cancels_edit() {
        let (mut app, rx, _tx) = test_app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "zzz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.request.ticker, "TSLA");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn choice_controls_submit_on_change() {
        let (mut app, rx, _tx) = test_app();
        for _ in 0..4 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.selected_control(), Control::ChartType);
        press(&mut app, KeyCode::Char('l'));
        assert!(rx.try_recv().is_ok());

        // Enter on a choice control steps it.
        press(&mut app, KeyCode::Enter);
        assert!(rx.try_recv().is_ok());
    }

    fn key_strategy() -> impl proptest::strategy::Strategy<Value = KeyCode> {
        use proptest::prelude::*;
        prop_oneof![
            prop::sample::select(vec!['j', 'k', 'h', 'l', '1', '4', '?', 'e', 'x', 'a', '-', '.'])
                .prop_map(KeyCode::Char),
            Just(KeyCode::Enter),
            Just(KeyCode::Esc),
            Just(KeyCode::Backspace),
            Just(KeyCode::Tab),
            Just(KeyCode::BackTab),
            Just(KeyCode::Left),
            Just(KeyCode::Right),
            Just(KeyCode::PageDown),
        ]
    }

    proptest::proptest! {
        #[test]
        fn random_keys_keep_state_valid(keys in proptest::collection::vec(key_strategy(), 0..200)) {
            let (mut app, _rx, _tx) = test_app();
            for code in keys {
                press(&mut app, code);
                proptest::prop_assert!(app.cursor < Control::ALL.len());
                proptest::prop_assert!(
                    tradewise_core::indicators::SMA_PERIOD_RANGE.contains(&app.sma_period)
                );
                proptest::prop_assert!(app.request.alerts.rsi.threshold <= 100.0);
            }
        }
    }

    #[test]
    fn key_release_is_ignored() {
        let (mut app, _rx, _tx) = test_app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(app.running);
    }
}
