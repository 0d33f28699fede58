//! Multi-step protocols as lists of named steps


use crate::Result;


/// One step of a protocol
///
/// A step either passes, or fails with the reason. Protocols are plain slices
/// of steps, so the order they run in can be inspected without running them.
pub struct Step<C> {
    pub name: &'static str,
    pub run:  fn(&mut C) -> Result,
}

impl<C> Step<C> {
    pub fn new(name: &'static str, run: fn(&mut C) -> Result) -> Self {
        Self {
            name,
            run,
        }
    }
}

// Derived impls would require `C: Clone`.
impl<C> Clone for Step<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Step<C> {}


/// Run steps in order, stopping at the first one that fails
pub fn run_steps<C>(ctx: &mut C, steps: &[Step<C>]) -> Result {
    for step in steps {
        log::debug!("Step: {}", step.name);

        if let Err(err) = (step.run)(ctx) {
            log::debug!("Step failed: {} ({:?})", step.name, err);
            return Err(err);
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use crate::{
        Error,
        Result,
        UsbFault,
    };

    use super::{
        Step,
        run_steps,
    };


    fn pass(log: &mut Vec<&'static str>) -> Result {
        log.push("pass");
        Ok(())
    }

    fn fail(log: &mut Vec<&'static str>) -> Result {
        log.push("fail");
        Err(Error::Usb(UsbFault::ShieldGround))
    }


    #[test]
    fn steps_should_run_in_order_until_one_fails() {
        let steps = [
            Step::new("first",  pass),
            Step::new("second", fail),
            Step::new("third",  pass),
        ];

        let mut log = Vec::new();
        let result = run_steps(&mut log, &steps);

        assert!(matches!(result, Err(Error::Usb(UsbFault::ShieldGround))));
        assert_eq!(log, ["pass", "fail"]);
    }

    #[test]
    fn passing_steps_should_all_run() {
        let steps = [Step::new("a", pass), Step::new("b", pass)];

        let mut log = Vec::new();
        run_steps(&mut log, &steps).unwrap();

        assert_eq!(log, ["pass", "pass"]);
    }
}
