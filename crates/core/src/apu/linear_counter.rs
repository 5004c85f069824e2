//! Linear counter for the triangle channel.
//!
//! A finer-grained duration gate than the length counter: it is clocked on
//! every quarter frame and reloaded from `$4008`.

#[derive(Debug, Clone, Default)]
pub struct LinearCounter {
    pub counter: u8,
    /// Set by writes to `$400B`; cleared on a clock once the control bit is off
    pub reload_flag: bool,
    /// 7-bit reload value from `$4008`
    pub reload_value: u8,
}

impl LinearCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the linear counter (quarter frame).
    ///
    /// `halted` is the triangle control bit, which also halts the length counter.
    pub fn clock(&mut self, enabled: bool, halted: bool) {
        if !enabled {
            self.counter = 0;
        } else if self.reload_flag {
            self.counter = self.reload_value;
        } else if self.counter > 0 {
            self.counter -= 1;
        }

        if !halted {
            self.reload_flag = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_flag_loads_counter() {
        let mut lin = LinearCounter::new();
        lin.reload_value = 10;
        lin.reload_flag = true;

        lin.clock(true, false);
        assert_eq!(lin.counter, 10);
        // Flag clears when control bit is off
        assert!(!lin.reload_flag);

        lin.clock(true, false);
        assert_eq!(lin.counter, 9);
    }

    #[test]
    fn control_bit_keeps_reloading() {
        let mut lin = LinearCounter::new();
        lin.reload_value = 5;
        lin.reload_flag = true;

        for _ in 0..4 {
            lin.clock(true, true);
            assert_eq!(lin.counter, 5);
            assert!(lin.reload_flag);
        }
    }

    #[test]
    fn disabled_forces_zero() {
        let mut lin = LinearCounter::new();
        lin.counter = 20;
        lin.clock(false, true);
        assert_eq!(lin.counter, 0);
        assert!(!lin.is_active());
    }
}
