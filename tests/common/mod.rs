//! Simulated XPT2046 behind fake GPIO lines.
//!
//! The controller latches DIN on each rising clock edge and counts falling
//! edges. After the 8th falling edge it picks the conversion result for the
//! commanded channel; after the acquisition clock (9th falling edge) DOUT
//! presents the result MSB first, one bit per falling edge.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error, ErrorKind, ErrorType, InputPin, OutputPin};
use tft_touch::{BitBangBus, Xpt2046};

pub const READ_X: u8 = 0xD0;
pub const READ_Y: u8 = 0x90;

/// One chip-select frame as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub clocks: u32,
    pub value: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Frame(Frame),
    DelayNs(u64),
}

#[derive(Default)]
pub struct Controller {
    pub cs: Option<bool>,
    pub clk: Option<bool>,
    pub din: Option<bool>,
    /// Forces DOUT to a fixed level, as an unwired or floating line would
    pub dout_stuck: Option<bool>,
    /// Raising the clock fails once this many clocks of a frame have run
    pub clock_fault_after: Option<u32>,
    x_samples: VecDeque<u16>,
    y_samples: VecDeque<u16>,
    last_x: u16,
    last_y: u16,
    falling_edges: u32,
    command: u8,
    value: u16,
    pub events: Vec<Event>,
}

impl Controller {
    fn selected(&self) -> bool {
        self.cs == Some(false)
    }

    fn next_sample(&mut self) -> u16 {
        match self.command {
            READ_X => {
                if let Some(v) = self.x_samples.pop_front() {
                    self.last_x = v;
                }
                self.last_x
            }
            READ_Y => {
                if let Some(v) = self.y_samples.pop_front() {
                    self.last_y = v;
                }
                self.last_y
            }
            _ => 0,
        }
    }

    fn set_cs(&mut self, level: bool) {
        let was_selected = self.selected();
        self.cs = Some(level);

        if !level && !was_selected {
            self.falling_edges = 0;
            self.command = 0;
            self.value = 0;
        } else if level && was_selected {
            self.events.push(Event::Frame(Frame {
                command: self.command,
                clocks: self.falling_edges,
                value: self.value,
            }));
        }
    }

    fn set_clk(&mut self, level: bool) -> Result<(), PinFault> {
        let faulted = self
            .clock_fault_after
            .is_some_and(|clocks| self.falling_edges >= clocks);
        if level && self.selected() && faulted {
            return Err(PinFault);
        }

        let previous = self.clk;
        self.clk = Some(level);
        if !self.selected() {
            return Ok(());
        }

        match (previous, level) {
            (Some(false), true) if self.falling_edges < 8 => {
                self.command = (self.command << 1) | u8::from(self.din == Some(true));
            }
            (Some(true), false) => {
                self.falling_edges += 1;
                if self.falling_edges == 8 {
                    self.value = self.next_sample() & 0x0FFF;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn dout(&self) -> bool {
        if let Some(level) = self.dout_stuck {
            return level;
        }
        match self.falling_edges {
            n @ 9..=20 if self.selected() => (self.value >> (20 - n)) & 1 == 1,
            _ => false,
        }
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Frame(f) => Some(*f),
                Event::DelayNs(_) => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.frames().iter().map(|f| f.command).collect()
    }

    pub fn total_delay_ns(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                Event::DelayNs(ns) => *ns,
                Event::Frame(_) => 0,
            })
            .sum()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

/// Error returned by a failing simulated line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Clone, Copy)]
enum Line {
    Cs,
    Clk,
    Din,
    Dout,
}

pub struct SimPin {
    ctl: Rc<RefCell<Controller>>,
    line: Line,
}

impl ErrorType for SimPin {
    type Error = PinFault;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ctl.borrow().dout())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.ctl.borrow().dout())
    }
}

impl SimPin {
    fn set(&mut self, level: bool) -> Result<(), PinFault> {
        let mut ctl = self.ctl.borrow_mut();
        match self.line {
            Line::Cs => ctl.set_cs(level),
            Line::Clk => return ctl.set_clk(level),
            Line::Din => ctl.din = Some(level),
            Line::Dout => panic!("DOUT driven by the host"),
        }
        Ok(())
    }
}

pub struct SimDelay {
    ctl: Rc<RefCell<Controller>>,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut ctl = self.ctl.borrow_mut();
        match ctl.events.last_mut() {
            Some(Event::DelayNs(total)) => *total += u64::from(ns),
            _ => ctl.events.push(Event::DelayNs(u64::from(ns))),
        }
    }
}

pub type SimBus = BitBangBus<SimPin, SimPin, SimPin, SimPin>;
pub type SimTouch = Xpt2046<SimBus, SimDelay>;

pub struct Rig {
    pub ctl: Rc<RefCell<Controller>>,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            ctl: Rc::new(RefCell::new(Controller::default())),
        }
    }

    fn pin(&self, line: Line) -> SimPin {
        SimPin {
            ctl: Rc::clone(&self.ctl),
            line,
        }
    }

    pub fn touch(&self) -> SimTouch {
        let delay = SimDelay {
            ctl: Rc::clone(&self.ctl),
        };
        Xpt2046::from_pins(
            self.pin(Line::Cs),
            self.pin(Line::Clk),
            self.pin(Line::Din),
            self.pin(Line::Dout),
            delay,
        )
        .unwrap()
    }

    /// Queue successive conversion results; the last one repeats once the
    /// queue runs dry.
    pub fn queue_x(&self, samples: &[u16]) {
        self.ctl.borrow_mut().x_samples.extend(samples);
    }

    pub fn queue_y(&self, samples: &[u16]) {
        self.ctl.borrow_mut().y_samples.extend(samples);
    }

    /// Hold the panel at one raw position
    pub fn hold(&self, x: u16, y: u16) {
        let mut ctl = self.ctl.borrow_mut();
        ctl.x_samples.clear();
        ctl.y_samples.clear();
        ctl.last_x = x;
        ctl.last_y = y;
    }

    /// Make the clock line fail after `clocks` clocks of every frame
    pub fn fail_clock_after(&self, clocks: Option<u32>) {
        self.ctl.borrow_mut().clock_fault_after = clocks;
    }

    pub fn stick_dout(&self, level: bool) {
        self.ctl.borrow_mut().dout_stuck = Some(level);
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.ctl.borrow().frames()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.ctl.borrow().commands()
    }

    pub fn total_delay_ns(&self) -> u64 {
        self.ctl.borrow().total_delay_ns()
    }

    pub fn clear_events(&self) {
        self.ctl.borrow_mut().clear_events();
    }
}
