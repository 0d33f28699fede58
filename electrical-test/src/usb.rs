//! Test of the board's USB connector
//!
//! Checks that both grounds are connected, that D+ and D- float while the
//! board's pull-up is disabled, and that enabling the pull-up affects D+ only.


use protocol::pin::{
    Level,
    Mode,
};

use crate::{
    Context,
    Error,
    HardwareError,
    Result,
    UsbFault,
    io::{
        JigIo,
        TargetIo,
    },
    report::Report,
    step::{
        Step,
        run_steps,
    },
};


/// The steps of one USB test iteration, in order
pub fn usb_steps<J, T, R>() -> [Step<Context<J, T, R>>; 6]
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    [
        Step::new("disable USB pull-up", disable_pullup::<J, T, R>),
        Step::new("USB grounds", check_grounds::<J, T, R>),
        Step::new("D- high-Z", check_d_minus_high_z::<J, T, R>),
        Step::new("D+ high-Z", check_d_plus_high_z::<J, T, R>),
        Step::new("enable USB pull-up", enable_pullup::<J, T, R>),
        Step::new(
            "D+ pulled up, D- high-Z",
            check_pullup_on_d_plus_only::<J, T, R>,
        ),
    ]
}


impl<J, T, R> Context<J, T, R>
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    /// Run the USB test iterations, aborting at the first failed step
    pub fn test_usb_connections(&mut self) -> Result {
        self.info(format_args!("Testing USB connections"));

        let steps = usb_steps();

        for iteration in 0 .. self.config.usb_iterations {
            log::debug!("USB iteration {}", iteration + 1);
            run_steps(self, &steps)?;
        }

        Ok(())
    }

    fn usb_fault(&mut self, fault: UsbFault) -> Error {
        self.error(format_args!("{}", fault));
        fault.into()
    }
}


fn disable_pullup<J, T, R>(ctx: &mut Context<J, T, R>) -> Result
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    ctx.target.set_usb_pullup(false)
        .map_err(HardwareError::target)?;
    Ok(())
}

fn enable_pullup<J, T, R>(ctx: &mut Context<J, T, R>) -> Result
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    ctx.target.set_usb_pullup(true)
        .map_err(HardwareError::target)?;
    Ok(())
}

/// A connected ground wins against the jig's pull-up
fn check_grounds<J, T, R>(ctx: &mut Context<J, T, R>) -> Result
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    let shield = ctx.config.pins.usb_shield_ground;
    let signal = ctx.config.pins.usb_signal_ground;

    ctx.jig.set_mode(shield, Mode::InputPullUp)
        .map_err(HardwareError::jig)?;
    ctx.jig.set_mode(signal, Mode::InputPullUp)
        .map_err(HardwareError::jig)?;

    let level = ctx.jig.read(shield)
        .map_err(HardwareError::jig)?;
    if level != Level::Low {
        return Err(ctx.usb_fault(UsbFault::ShieldGround));
    }

    let level = ctx.jig.read(signal)
        .map_err(HardwareError::jig)?;
    if level != Level::Low {
        return Err(ctx.usb_fault(UsbFault::SignalGround));
    }

    Ok(())
}

fn check_d_minus_high_z<J, T, R>(ctx: &mut Context<J, T, R>) -> Result
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    if !ctx.is_high_z(ctx.config.pins.usb_d_minus)? {
        return Err(ctx.usb_fault(UsbFault::DMinusNotHighZ));
    }
    Ok(())
}

fn check_d_plus_high_z<J, T, R>(ctx: &mut Context<J, T, R>) -> Result
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    if !ctx.is_high_z(ctx.config.pins.usb_d_plus)? {
        return Err(ctx.usb_fault(UsbFault::DPlusNotHighZ));
    }
    Ok(())
}

/// With the pull-up enabled, D- going anywhere means it's shorted to D+
fn check_pullup_on_d_plus_only<J, T, R>(ctx: &mut Context<J, T, R>) -> Result
    where
        J: JigIo,
        T: TargetIo,
        R: Report,
{
    if !ctx.has_pull(ctx.config.pins.usb_d_plus, Level::High)? {
        return Err(ctx.usb_fault(UsbFault::DPlusNoPullUp));
    }
    if !ctx.is_high_z(ctx.config.pins.usb_d_minus)? {
        return Err(ctx.usb_fault(UsbFault::DMinusShortToDPlus));
    }
    Ok(())
}
