//! Active Hour watchface
//!
//! Time in the middle, optional step/sleep and date labels above and below,
//! and a ring of minute dots. Minutes of the current hour that already
//! passed are drawn in the main color, the rest still shows last hour's
//! activity in the dark color.

use chrono::{NaiveDateTime, Timelike};
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Point,
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::Rgb565,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
    Drawable,
};
use profont::{PROFONT_14_POINT, PROFONT_24_POINT};

use super::{DialGeometry, Label, Palette, WatchFace};
use crate::{
    activity::{dots_for_steps, DotArray, MinuteTally, MINUTES_PER_HOUR},
    clock::{backfill_due, DateText, SleepText, TimeSnapshot, TimeText},
    error::Error,
    health::{sum_or_zero, HealthEvent, HealthMetric, HealthService, MinuteRecord},
    settings::{apply_message, ConfigMessage, Settings, SettingsStore},
};

/// Below this many steps the label shows last night's sleep instead
const STEPS_LABEL_THRESHOLD: u32 = 500;

const STEPS_OFFSET: Point = Point::new(0, -44);
const DATE_OFFSET: Point = Point::new(0, 42);

pub struct ActivityFace<H> {
    health: H,
    settings: Settings,
    palette: Palette,
    geometry: DialGeometry,
    dots: DotArray,
    tally: MinuteTally,
    last_time: TimeSnapshot,
    /// Minute history was incomplete at start and should be fetched again
    awaiting_backfill: bool,
    time_label: Label<8>,
    date_label: Label<16>,
    steps_label: Label<16>,
    dirty: bool,
}

fn draw_label<D>(
    target: &mut D,
    text: &str,
    position: Point,
    font: &MonoFont<'_>,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if text.is_empty() {
        return Ok(());
    }
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(text, position, MonoTextStyle::new(font, color), text_style)
        .draw(target)?;
    Ok(())
}

impl<H> ActivityFace<H>
where
    H: HealthService,
{
    /// Create the face and load the past hour of activity
    pub fn new(health: H, settings: Settings, geometry: DialGeometry, now: NaiveDateTime) -> Self {
        let mut face = Self {
            health,
            settings,
            palette: Palette::for_scheme(settings.color_scheme()),
            geometry,
            dots: DotArray::new(),
            tally: MinuteTally::default(),
            last_time: TimeSnapshot::from(now),
            awaiting_backfill: false,
            time_label: Label::new(),
            date_label: Label::new(),
            steps_label: Label::new(),
            dirty: true,
        };

        // History for the last minutes is only complete right after a quarter hour
        face.awaiting_backfill = !backfill_due(now.minute());
        face.tally = MinuteTally::new(sum_or_zero(&mut face.health, HealthMetric::StepCount, now));
        face.backfill(now);
        face.refresh_time_labels(now);
        face.refresh_steps_label(now);
        face
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn geometry(&self) -> &DialGeometry {
        &self.geometry
    }

    pub fn dots(&self) -> &DotArray {
        &self.dots
    }

    pub fn last_time(&self) -> TimeSnapshot {
        self.last_time
    }

    pub fn health(&self) -> &H {
        &self.health
    }

    pub fn health_mut(&mut self) -> &mut H {
        &mut self.health
    }

    pub fn time_text(&self) -> &str {
        self.time_label.as_str()
    }

    pub fn date_text(&self) -> &str {
        self.date_label.as_str()
    }

    pub fn steps_text(&self) -> &str {
        self.steps_label.as_str()
    }

    /// Fill the dial from the health source's minute history
    fn backfill(&mut self, now: NaiveDateTime) {
        let mut records = [MinuteRecord::default(); MINUTES_PER_HOUR];
        let count = self.health.minute_history(now, &mut records);
        info!("Minute history records: {}", count);

        self.dots.apply_history(now.minute() as usize, &records[..count]);
        self.dirty = true;
    }

    fn refresh_time_labels(&mut self, now: NaiveDateTime) {
        let time = TimeText::new(&now, self.settings.clock_24h);
        if self.time_label.set(format_args!("{}", time)).is_err() {
            warn!("Time does not fit its label");
        }

        if self.settings.show_date {
            if self.date_label.set(format_args!("{}", DateText::new(&now))).is_err() {
                warn!("Date does not fit its label");
            }
        } else {
            self.date_label.clear();
        }
    }

    fn refresh_steps_label(&mut self, now: NaiveDateTime) {
        if !self.settings.show_steps {
            self.steps_label.clear();
            return;
        }

        let total = self.tally.last_total();
        let result = if total > STEPS_LABEL_THRESHOLD {
            self.steps_label.set(format_args!("{}", total))
        } else {
            let sleep = sum_or_zero(&mut self.health, HealthMetric::SleepSeconds, now);
            self.steps_label.set(format_args!("{}", SleepText::new(sleep)))
        };
        if result.is_err() {
            warn!("Step count does not fit its label");
        }
    }

    /// Dots for the minute in progress, from the steps taken since it started
    pub fn current_minute_dots(&mut self, now: NaiveDateTime) -> u8 {
        let total = sum_or_zero(&mut self.health, HealthMetric::StepCount, now);
        let minute_steps = self.tally.advance(total);
        debug!("Steps in current minute: {}", minute_steps);

        self.refresh_steps_label(now);
        dots_for_steps(minute_steps)
    }

    pub fn on_health_event(&mut self, event: HealthEvent) {
        if event == HealthEvent::MovementUpdate {
            trace!("Movement update");
            self.dirty = true;
        }
    }

    /// Switch to new settings and refresh everything that depends on them
    pub fn apply_settings(&mut self, settings: Settings, now: NaiveDateTime) {
        self.settings = settings;
        self.palette = Palette::for_scheme(settings.color_scheme());
        self.refresh_time_labels(now);
        self.refresh_steps_label(now);
        self.dirty = true;
    }

    /// Apply a configuration message from the companion app.
    ///
    /// Malformed messages are dropped without touching the store.
    pub fn on_config_message<S>(
        &mut self,
        store: &mut S,
        bytes: &[u8],
        now: NaiveDateTime,
    ) -> Result<(), Error>
    where
        S: SettingsStore + ?Sized,
    {
        let message = ConfigMessage::parse(bytes).map_err(|err| {
            error!("Message dropped!");
            err
        })?;
        apply_message(store, &message)?;
        let settings = Settings::load(store)?;
        self.apply_settings(settings, now);
        Ok(())
    }
}

impl<H> WatchFace for ActivityFace<H>
where
    H: HealthService,
{
    fn on_minute_tick(&mut self, now: NaiveDateTime) {
        self.last_time = TimeSnapshot::from(now);
        let minute = self.last_time.minute as usize;

        // Start the next minute fresh
        let total = sum_or_zero(&mut self.health, HealthMetric::StepCount, now);
        self.tally.reset_total(total);
        self.tally.start_minute();
        self.dots.start_minute(minute);

        if self.awaiting_backfill && backfill_due(now.minute()) {
            self.backfill(now);
            self.awaiting_backfill = false;
            debug!("Loaded missing minute history");
        }

        self.refresh_time_labels(now);
        self.dirty = true;
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }

    fn draw<D>(&mut self, now: NaiveDateTime, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let current = self.last_time.minute as usize;
        let current_dots = self.current_minute_dots(now);
        self.dots.set(current, current_dots);

        target.clear(self.palette.background)?;

        let center = self.geometry.center;
        draw_label(
            target,
            self.time_label.as_str(),
            center,
            &PROFONT_24_POINT,
            self.palette.time,
        )?;
        draw_label(
            target,
            self.steps_label.as_str(),
            center + STEPS_OFFSET,
            &PROFONT_14_POINT,
            self.palette.steps,
        )?;
        draw_label(
            target,
            self.date_label.as_str(),
            center + DATE_OFFSET,
            &PROFONT_14_POINT,
            self.palette.date,
        )?;

        for minute in 0..MINUTES_PER_HOUR {
            let elapsed = minute <= current;
            let color = if elapsed {
                self.palette.dot_main
            } else {
                self.palette.dot_dark
            };
            let dots = match self.dots.get(minute) {
                0 if elapsed => 1,
                dots => dots,
            };
            self.geometry.draw_minute(target, minute, dots, color)?;
        }

        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::fake::FakeHealth;
    use crate::settings::{ColorScheme, MemoryStore, SettingKey};
    use crate::ui::testing::Framebuffer;
    use chrono::NaiveDate;
    use embedded_graphics::{geometry::Size, pixelcolor::RgbColor};

    const SIZE: Size = Size::new(240, 240);

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn history(steps: &[(usize, u32)]) -> Vec<MinuteRecord> {
        let mut records = vec![MinuteRecord::default(); 59];
        for &(index, count) in steps {
            records[index].steps = count;
        }
        records
    }

    fn face(health: FakeHealth, settings: Settings, now: NaiveDateTime) -> ActivityFace<FakeHealth> {
        ActivityFace::new(health, settings, DialGeometry::for_display(SIZE), now)
    }

    #[test]
    fn test_start_loads_history() {
        let mut health = FakeHealth::with_steps(1_000);
        health.history = history(&[(0, 45)]);
        let face = face(health, Settings::default(), at(10, 10));

        assert_eq!(face.dots().get(11), 3);
        assert_eq!(face.dots().get(9), 1);
        assert_eq!(face.dots().get(10), 0);
        assert_eq!(face.health().history_requests, 1);
        assert!(face.needs_redraw());
    }

    #[test]
    fn test_missing_history_fetched_once() {
        let mut face = face(FakeHealth::with_steps(0), Settings::default(), at(10, 10));

        face.on_minute_tick(at(10, 11));
        assert_eq!(face.health().history_requests, 1);

        face.on_minute_tick(at(10, 16));
        assert_eq!(face.health().history_requests, 2);

        face.on_minute_tick(at(10, 31));
        assert_eq!(face.health().history_requests, 2);
    }

    #[test]
    fn test_start_at_quarter_past_does_not_refetch() {
        let mut face = face(FakeHealth::with_steps(0), Settings::default(), at(10, 16));
        face.on_minute_tick(at(10, 31));
        assert_eq!(face.health().history_requests, 1);
    }

    #[test]
    fn test_tick_starts_fresh_minute() {
        let mut face = face(FakeHealth::with_steps(1_000), Settings::default(), at(10, 10));
        face.health_mut().steps = Some(1_100);
        face.on_minute_tick(at(10, 11));

        assert_eq!(face.dots().get(11), 1);
        assert_eq!(face.last_time().minute, 11);
        // Steps before the tick do not count for the new minute
        assert_eq!(face.current_minute_dots(at(10, 11)), 1);
        face.health_mut().steps = Some(1_131);
        assert_eq!(face.current_minute_dots(at(10, 11)), 3);
    }

    #[test]
    fn test_draw_dots() {
        let mut health = FakeHealth::with_steps(1_000);
        // Record 19 lands on minute 30, last hour's activity
        health.history = history(&[(19, 100)]);
        let mut face = face(health, Settings::default(), at(10, 10));
        face.health_mut().steps = Some(1_065);

        let mut display = Framebuffer::new(SIZE);
        face.draw(at(10, 10), &mut display).unwrap();

        let dial = *face.geometry();
        let palette = *face.palette();

        // Current minute: 65 steps make four dots
        assert_eq!(face.dots().get(10), 4);
        assert_eq!(display.pixel(dial.dot_position(10, 3)), palette.dot_main);
        assert_eq!(display.pixel(dial.dot_position(10, 4)), palette.background);

        // Passed minute without steps keeps a single dot
        assert_eq!(display.pixel(dial.dot_position(5, 0)), palette.dot_main);
        assert_eq!(display.pixel(dial.dot_position(5, 1)), palette.background);

        // Upcoming minute shows last hour in the dark color
        assert_eq!(display.pixel(dial.dot_position(30, 4)), palette.dot_dark);
        assert_eq!(display.pixel(dial.dot_position(31, 0)), palette.dot_dark);
        assert_eq!(display.pixel(dial.dot_position(31, 1)), palette.background);

        assert_eq!(display.count(Rgb565::MAGENTA), 0);
        assert!(!face.needs_redraw());
    }

    #[test]
    fn test_unknown_minutes_before_current_get_one_dot() {
        let mut face = face(FakeHealth::default(), Settings::default(), at(10, 10));
        let mut display = Framebuffer::new(SIZE);
        face.draw(at(10, 10), &mut display).unwrap();

        let dial = *face.geometry();
        let palette = *face.palette();
        assert_eq!(face.dots().get(3), 0);
        assert_eq!(display.pixel(dial.dot_position(3, 0)), palette.dot_main);
        assert_eq!(display.pixel(dial.dot_position(40, 0)), palette.background);
    }

    #[test]
    fn test_steps_label() {
        let settings = Settings {
            show_steps: true,
            ..Settings::default()
        };

        let face_with_steps = face(FakeHealth::with_steps(800), settings, at(10, 10));
        assert_eq!(face_with_steps.steps_text(), "800");

        let mut health = FakeHealth::with_steps(100);
        health.sleep = Some(27_000);
        let face_with_sleep = face(health, settings, at(7, 0));
        assert_eq!(face_with_sleep.steps_text(), "7h 30m");

        let face_without_data = face(FakeHealth::default(), settings, at(7, 0));
        assert_eq!(face_without_data.steps_text(), "0h 0m");

        let hidden = face(FakeHealth::with_steps(800), Settings::default(), at(10, 10));
        assert_eq!(hidden.steps_text(), "");

        let mut health = FakeHealth::with_steps(500);
        health.sleep = Some(3_600);
        let at_threshold = self::face(health, settings, at(10, 10));
        assert_eq!(at_threshold.steps_text(), "1h 0m");

        let mut health = FakeHealth::with_steps(501);
        health.sleep = Some(3_600);
        let past_threshold = self::face(health, settings, at(10, 10));
        assert_eq!(past_threshold.steps_text(), "501");
    }

    #[test]
    fn test_time_and_date_labels() {
        let settings = Settings {
            show_date: true,
            clock_24h: false,
            ..Settings::default()
        };
        let mut face = face(FakeHealth::default(), settings, at(13, 30));
        assert_eq!(face.time_text(), " 1:30");
        assert_eq!(face.date_text(), "Fri, Oct 16");

        face.on_minute_tick(at(13, 31));
        assert_eq!(face.time_text(), " 1:31");

        let hidden = self::face(FakeHealth::default(), Settings::default(), at(13, 30));
        assert_eq!(hidden.time_text(), "13:30");
        assert_eq!(hidden.date_text(), "");
    }

    #[test]
    fn test_config_message_updates_face() {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&mut store).unwrap();
        let mut face = face(FakeHealth::with_steps(900), settings, at(10, 10));
        let mut display = Framebuffer::new(SIZE);
        face.draw(at(10, 10), &mut display).unwrap();

        face.on_config_message(&mut store, b"\x00\x04true\x03\x04true\x01\x04true", at(10, 10))
            .unwrap();

        assert!(face.settings().show_date);
        assert!(face.settings().show_steps);
        assert_eq!(face.settings().color_scheme(), ColorScheme::Orange);
        assert_eq!(face.palette().dot_main, Rgb565::new(31, 21, 0));
        assert_eq!(face.palette().steps, Rgb565::new(31, 42, 10));
        assert_eq!(face.date_text(), "Fri, Oct 16");
        assert_eq!(face.steps_text(), "900");
        assert!(store.read_bool(SettingKey::ColorOrange.id()));
        assert!(face.needs_redraw());

        // Switching a label off clears it
        face.on_config_message(&mut store, b"\x00\x05false", at(10, 10))
            .unwrap();
        assert_eq!(face.date_text(), "");
    }

    #[test]
    fn test_malformed_config_message_is_dropped() {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&mut store).unwrap();
        let mut face = face(FakeHealth::default(), settings, at(10, 10));

        assert_eq!(
            face.on_config_message(&mut store, b"\x00\x09true", at(10, 10)),
            Err(Error::MalformedMessage(1))
        );
        assert_eq!(*face.settings(), settings);
        assert!(!store.read_bool(SettingKey::Date.id()));
    }

    #[test]
    fn test_only_movement_marks_dirty() {
        let mut face = face(FakeHealth::default(), Settings::default(), at(10, 10));
        let mut display = Framebuffer::new(SIZE);
        face.draw(at(10, 10), &mut display).unwrap();

        face.on_health_event(HealthEvent::SleepUpdate);
        face.on_health_event(HealthEvent::SignificantUpdate);
        assert!(!face.needs_redraw());

        face.on_health_event(HealthEvent::MovementUpdate);
        assert!(face.needs_redraw());
    }
}
