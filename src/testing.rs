//! Pins that record what happens on the bus, for the unit tests.
//!
//! All pins of one `Wire` share their state. Bits are sampled on every rising clock edge while at
//! least one chip select line is low, and grouped into transactions (from the first chip select
//! going low until the last one going high again).

use std::cell::RefCell;
use std::rc::Rc;

use hal::digital::v2::OutputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Clk,
    Data,
    Cs(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFault;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub chips: Vec<usize>,
    pub bits: Vec<bool>,
}

impl Transaction {
    pub fn reader(&self) -> BitReader<'_> {
        BitReader { bits: &self.bits, pos: 0 }
    }
}

pub struct BitReader<'a> {
    bits: &'a [bool],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn msb(&mut self, n: usize) -> u8 {
        let mut value = 0;
        for _ in 0..n {
            value = (value << 1) | self.bits[self.pos] as u8;
            self.pos += 1;
        }
        value
    }

    pub fn lsb(&mut self, n: usize) -> u8 {
        let mut value = 0;
        for i in 0..n {
            value |= (self.bits[self.pos] as u8) << i;
            self.pos += 1;
        }
        value
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

#[derive(Debug, Default)]
struct State {
    clk: bool,
    data: bool,
    selected: Vec<usize>,
    open: Option<Transaction>,
    done: Vec<Transaction>,
    deselected: Vec<usize>,
    broken: Option<Line>,
}

#[derive(Debug, Clone, Default)]
pub struct Wire {
    state: Rc<RefCell<State>>,
}

impl Wire {
    pub fn new() -> Wire {
        Wire::default()
    }

    pub fn pin(&self, line: Line) -> WirePin {
        WirePin { line, state: self.state.clone() }
    }

    /// Every write to `line` fails from now on
    pub fn break_line(&self, line: Line) {
        self.state.borrow_mut().broken = Some(line);
    }

    pub fn level(&self, line: Line) -> bool {
        let state = self.state.borrow();
        match line {
            Line::Clk => state.clk,
            Line::Data => state.data,
            Line::Cs(chip) => !state.selected.contains(&chip),
        }
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.borrow().done.clone()
    }

    /// chips that were deselected at least once
    pub fn deselected(&self) -> Vec<usize> {
        self.state.borrow().deselected.clone()
    }

    pub fn any_selected(&self) -> bool {
        !self.state.borrow().selected.is_empty()
    }

    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.done.clear();
        state.deselected.clear();
    }
}

#[derive(Debug)]
pub struct WirePin {
    line: Line,
    state: Rc<RefCell<State>>,
}

impl WirePin {
    fn set(&mut self, high: bool) -> Result<(), WireFault> {
        let mut state = self.state.borrow_mut();
        if state.broken == Some(self.line) {
            return Err(WireFault);
        }
        match self.line {
            Line::Clk => {
                let rising = !state.clk && high;
                state.clk = high;
                if rising {
                    let data = state.data;
                    if let Some(open) = state.open.as_mut() {
                        open.bits.push(data);
                    }
                }
            }
            Line::Data => state.data = high,
            Line::Cs(chip) => {
                if high {
                    if state.selected.contains(&chip) {
                        state.selected.retain(|c| *c != chip);
                        state.deselected.push(chip);
                        if state.selected.is_empty() {
                            if let Some(open) = state.open.take() {
                                state.done.push(open);
                            }
                        }
                    }
                } else if !state.selected.contains(&chip) {
                    state.selected.push(chip);
                    state.open.get_or_insert_with(Transaction::default).chips.push(chip);
                }
            }
        }
        Ok(())
    }
}

impl OutputPin for WirePin {
    type Error = WireFault;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}
