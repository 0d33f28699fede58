//! A simulated board on a simulated jig
//!
//! Models just enough electrical behavior to run the complete electrical test
//! without hardware: a PWM power supply whose output takes time to reach the
//! board, floating lines that remember the last driven level, pull resistors,
//! and an 8-bit output port. Faults can be injected to make specific checks
//! fail.
//!
//! Time is virtual. It only advances when the test calls `JigIo::delay`.
//!
//! Every request is recorded as an [`Event`], so tests can check what was done
//! to the hardware and in which order.


use std::{
    cell::{
        RefCell,
        RefMut,
    },
    collections::HashMap,
    rc::Rc,
    time::Duration,
};

use protocol::{
    JigPin,
    TargetPin,
    pin::{
        Level,
        Mode,
    },
};

use crate::{
    Context,
    config::Config,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
};


/// Output of the board's voltage regulator, in volts
pub const REGULATOR_VOLTS: f32 = 3.3;


/// The simulated test stand
///
/// Hands out the jig and target halves, which share the same electrical
/// state. Cloning a `Board` creates another handle to the same state.
#[derive(Clone)]
pub struct Board {
    state: Rc<RefCell<State>>,
}

impl Board {
    /// A healthy board, wired to the jig as described by `config`
    pub fn new(config: &Config) -> Self {
        let pins = config.pins;

        let mut pulls = HashMap::new();
        pulls.insert(pins.usb_shield_ground, Level::Low);
        pulls.insert(pins.usb_signal_ground, Level::Low);

        let state = State {
            config:         config.clone(),
            now:            Duration::from_millis(0),
            charge_time:    Duration::from_millis(25),
            supply:         SupplyState::default(),
            port:           0,
            outputs:        0,
            stuck:          [None; 8],
            rail_offsets:   HashMap::new(),
            lines:          HashMap::new(),
            pulls,
            scheduled:      Vec::new(),
            usb_pullup:     false,
            usb_short:      false,
            pullup_broken:  false,
            disables:       0,
            port_writes:    0,
            pullup_calls:   0,
            reject_port:    None,
            reject_pullup:  None,
            events:         Vec::new(),
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn jig(&self) -> SimJig {
        SimJig { state: self.state.clone() }
    }

    pub fn target(&self) -> SimTarget {
        SimTarget { state: self.state.clone() }
    }

    /// A test context that runs against this board
    pub fn context<R>(&self, config: Config, report: R)
        -> Context<SimJig, SimTarget, R>
        where R: Report
    {
        Context::new(self.jig(), self.target(), config, report)
    }

    /// How long the board's capacitors take to charge after a supply change
    pub fn set_charge_time(&self, charge_time: Duration) {
        self.state().charge_time = charge_time;
    }

    /// Force output line `line` (`0` to `7`) to `level`, whatever the port
    /// says
    ///
    /// # Panics
    ///
    /// Panics, if `line` is not one of the port's 8 lines.
    pub fn stick_output(&self, line: usize, level: Level) {
        assert!(line < 8, "No output line {}", line);
        self.state().stuck[line] = Some(level);
    }

    /// Add `volts` to everything measured on the analog channel `pin`
    pub fn offset_rail(&self, pin: JigPin, volts: f32) {
        self.state().rail_offsets.insert(pin, volts);
    }

    /// Disconnect a ground line, leaving it floating
    pub fn break_ground(&self, pin: JigPin) {
        self.state().pulls.remove(&pin);
    }

    /// Pull `pin` to `level` through a resistor on the board
    pub fn pull(&self, pin: JigPin, level: Level) {
        self.state().pulls.insert(pin, level);
    }

    /// Pull `pin` to `level`, once the USB pull-up has been disabled
    /// `disables` times
    pub fn pull_after_disables(&self, pin: JigPin, level: Level,
        disables: usize,
    ) {
        self.state().scheduled.push((disables, pin, level));
    }

    /// Short USB D+ to D-
    pub fn short_usb_data(&self) {
        self.state().usb_short = true;
    }

    /// Disconnect the board's USB pull-up resistor from D+
    ///
    /// The target still accepts requests to enable it.
    pub fn break_usb_pullup(&self) {
        self.state().pullup_broken = true;
    }

    /// Reject the port write with index `call`, counting from `0`
    pub fn reject_write_port(&self, call: usize) {
        self.state().reject_port = Some(call);
    }

    /// Reject the USB pull-up request with index `call`, counting from `0`
    pub fn reject_usb_pullup(&self, call: usize) {
        self.state().reject_pullup = Some(call);
    }

    /// Everything that happened so far
    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// All port writes the target received, including rejected ones
    pub fn port_writes(&self) -> Vec<u8> {
        self.state().events
            .iter()
            .filter_map(|event| match event {
                Event::WritePort { bits, .. } => Some(*bits),
                _                             => None,
            })
            .collect()
    }

    /// All USB pull-up requests the target received, including rejected ones
    pub fn usb_pullup_requests(&self) -> Vec<bool> {
        self.state().events
            .iter()
            .filter_map(|event| match event {
                Event::UsbPullup { enabled, .. } => Some(*enabled),
                _                                => None,
            })
            .collect()
    }

    /// The current value of the output port
    pub fn port(&self) -> u8 {
        self.state().port
    }

    /// The voltage currently present on the board's USB supply
    pub fn supply_volts(&self) -> f32 {
        self.state().supply_volts()
    }

    pub fn now(&self) -> Duration {
        self.state().now
    }

    fn state(&self) -> RefMut<State> {
        self.state.borrow_mut()
    }
}


/// The jig half of the simulation
#[derive(Clone)]
pub struct SimJig {
    state: Rc<RefCell<State>>,
}

impl JigIo for SimJig {
    type Error = SimError;

    fn set_mode(&mut self, pin: JigPin, mode: Mode) -> Result<(), SimError> {
        let mut state = self.state.borrow_mut();
        state.events.push(Event::SetMode { pin, mode });

        let line = state.line(pin);
        line.mode = mode;
        match mode {
            Mode::Output      => line.charge = line.driven,
            Mode::InputPullUp => line.charge = Level::High,
            Mode::Input       => (),
        }

        Ok(())
    }

    fn write(&mut self, pin: JigPin, level: Level) -> Result<(), SimError> {
        let mut state = self.state.borrow_mut();
        state.events.push(Event::Write { pin, level });

        let line = state.line(pin);
        line.driven = level;
        if line.mode == Mode::Output {
            line.charge = level;
        }

        Ok(())
    }

    fn read(&mut self, pin: JigPin) -> Result<Level, SimError> {
        let mut state = self.state.borrow_mut();

        let external = state.external(pin);
        let line     = state.line(pin);

        let level = match (line.mode, external) {
            (Mode::Output, _)   => line.driven,
            (_, Some(level))    => level,
            (Mode::InputPullUp, None) => Level::High,
            (Mode::Input, None) => line.charge,
        };
        if line.mode != Mode::Output {
            line.charge = level;
        }

        state.events.push(Event::Read { pin, level });
        Ok(level)
    }

    fn read_analog(&mut self, pin: JigPin) -> Result<u16, SimError> {
        let mut state = self.state.borrow_mut();

        let volts = state.analog_volts(pin);
        let raw   = state.to_raw(volts);

        state.events.push(Event::ReadAnalog { pin, raw });
        Ok(raw)
    }

    fn set_pwm(&mut self, pin: JigPin, frequency_hz: u32, duty: u8)
        -> Result<(), SimError>
    {
        let mut state = self.state.borrow_mut();
        state.events.push(Event::SetPwm { pin, frequency_hz, duty });

        if pin == state.config.pins.power_pwm {
            let full_scale = state.config.supply.full_scale;
            let previous   = state.supply_volts();

            state.supply = SupplyState {
                volts:      duty as f32 / 255.0 * full_scale,
                previous,
                changed_at: state.now,
            };
        }

        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        let mut state = self.state.borrow_mut();
        state.events.push(Event::Delay(duration));
        state.now += duration;
    }
}


/// The target half of the simulation
#[derive(Clone)]
pub struct SimTarget {
    state: Rc<RefCell<State>>,
}

impl TargetIo for SimTarget {
    type Error = SimError;

    fn set_mode(&mut self, pin: TargetPin, mode: Mode)
        -> Result<(), SimError>
    {
        let mut state = self.state.borrow_mut();
        state.events.push(Event::TargetMode { pin, mode });

        let first = state.config.pins.target_outputs.0;
        if let Some(n) = pin.0.checked_sub(first).filter(|&n| n < 8) {
            if mode == Mode::Output {
                state.outputs |= 1 << n;
            }
            else {
                state.outputs &= !(1 << n);
            }
        }

        Ok(())
    }

    fn write_port(&mut self, first: TargetPin, bits: u8)
        -> Result<(), SimError>
    {
        let mut state = self.state.borrow_mut();

        let call = state.port_writes;
        state.port_writes += 1;

        let accepted = state.reject_port != Some(call)
            && first == state.config.pins.target_outputs;
        state.events.push(Event::WritePort { bits, accepted });

        if !accepted {
            return Err(SimError::Rejected);
        }

        state.port = bits;
        Ok(())
    }

    fn set_usb_pullup(&mut self, enabled: bool) -> Result<(), SimError> {
        let mut state = self.state.borrow_mut();

        let call = state.pullup_calls;
        state.pullup_calls += 1;

        let accepted = state.reject_pullup != Some(call);
        state.events.push(Event::UsbPullup { enabled, accepted });

        if !accepted {
            return Err(SimError::Rejected);
        }

        state.usb_pullup = enabled;
        if !enabled {
            state.disables += 1;
        }

        Ok(())
    }
}


/// A request the simulated hardware received
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    SetMode { pin: JigPin, mode: Mode },
    Write { pin: JigPin, level: Level },
    Read { pin: JigPin, level: Level },
    ReadAnalog { pin: JigPin, raw: u16 },
    SetPwm { pin: JigPin, frequency_hz: u32, duty: u8 },
    Delay(Duration),
    TargetMode { pin: TargetPin, mode: Mode },
    WritePort { bits: u8, accepted: bool },
    UsbPullup { enabled: bool, accepted: bool },
}


#[derive(Debug)]
pub enum SimError {
    /// The request was rejected, as instructed through `Board`
    Rejected,
}


struct State {
    config:      Config,
    now:         Duration,
    charge_time: Duration,
    supply:      SupplyState,

    port:    u8,
    outputs: u8,
    stuck:   [Option<Level>; 8],

    rail_offsets: HashMap<JigPin, f32>,
    lines:        HashMap<JigPin, Line>,
    pulls:        HashMap<JigPin, Level>,
    scheduled:    Vec<(usize, JigPin, Level)>,

    usb_pullup:    bool,
    usb_short:     bool,
    pullup_broken: bool,
    disables:      usize,

    port_writes:   usize,
    pullup_calls:  usize,
    reject_port:   Option<usize>,
    reject_pullup: Option<usize>,

    events: Vec<Event>,
}

impl State {
    fn line(&mut self, pin: JigPin) -> &mut Line {
        self.lines.entry(pin).or_insert(
            Line {
                mode:   Mode::Input,
                driven: Level::Low,
                charge: Level::Low,
            }
        )
    }

    /// Whatever the board does to `pin`, if anything
    fn external(&self, pin: JigPin) -> Option<Level> {
        let pins = &self.config.pins;

        let scheduled = self.scheduled
            .iter()
            .rev()
            .find(|(after, p, _)| *p == pin && self.disables >= *after);
        if let Some(&(_, _, level)) = scheduled {
            return Some(level);
        }

        if let Some(&level) = self.pulls.get(&pin) {
            return Some(level);
        }

        let on_d_plus = pin == pins.usb_d_plus
            || self.usb_short && pin == pins.usb_d_minus;
        if self.usb_pullup && !self.pullup_broken && on_d_plus {
            return Some(Level::High);
        }

        None
    }

    /// The voltage that has actually reached the board
    fn supply_volts(&self) -> f32 {
        if self.now >= self.supply.changed_at + self.charge_time {
            self.supply.volts
        }
        else {
            self.supply.previous
        }
    }

    fn analog_volts(&self, pin: JigPin) -> f32 {
        let pins   = &self.config.pins;
        let supply = self.supply_volts();

        let volts = if pin == pins.target_vusb {
            supply
        }
        else if pin == pins.target_33v {
            supply.min(REGULATOR_VOLTS)
        }
        else if let Some(n) = pins.sense.iter().position(|&p| p == pin) {
            let driven = self.outputs >> n & 1 == 1 && self.port >> n & 1 == 1;
            let level  = self.stuck[n].unwrap_or(Level::from(driven));

            if level.is_high() { supply } else { 0.0 }
        }
        else {
            0.0
        };

        volts + self.rail_offsets.get(&pin).copied().unwrap_or(0.0)
    }

    fn to_raw(&self, volts: f32) -> u16 {
        let calibration = &self.config.calibration;
        let raw = (volts / calibration.scale()).round();

        raw.max(0.0).min(calibration.adc_max as f32) as u16
    }
}


#[derive(Default)]
struct SupplyState {
    volts:      f32,
    previous:   f32,
    changed_at: Duration,
}


struct Line {
    mode:   Mode,
    driven: Level,
    charge: Level,
}
