use electrical_test::{
    Config,
    Error,
    Node,
    Result,
    Stage,
    StageError,
    Transcript,
    UsbFault,
    pattern::SWEEP,
    sim::{
        Board,
        Event,
    },
};
use protocol::{
    TargetPin,
    pin::Level,
};


#[test]
fn it_should_pass_a_healthy_board() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    assert!(ctx.run_all());

    let report = &ctx.report;
    assert_eq!(report.count("Beginning electrical test"), 1);
    assert_eq!(report.count("Successfully completed electrical test"), 1);
    assert_eq!(report.errors().count(), 0);
    assert_eq!(
        report.last().map(|entry| entry.message.as_str()),
        Some("Successfully completed electrical test"),
    );

    assert_eq!(board.port_writes(), SWEEP);

    Ok(())
}

#[test]
fn it_should_log_the_stages_in_order() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    assert!(ctx.run_all());

    let messages: Vec<&str> = ctx.report.entries()
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "Enabling power supply",
            "Beginning electrical test",
            "Testing USB connections",
            "Testing data output patterns",
            "Successfully completed electrical test",
        ],
    );

    Ok(())
}

#[test]
fn it_should_initialize_the_target_before_testing() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    assert!(ctx.run_all());

    let events  = board.events();
    let outputs = events.iter()
        .position(|event| matches!(event, Event::TargetMode { .. }));
    let pullup  = events.iter()
        .position(|event| matches!(event, Event::UsbPullup { .. }));
    let usb     = events.iter()
        .position(|event| matches!(event, Event::Read { .. }));

    assert!(outputs < pullup);
    assert!(pullup < usb);

    // Init disables the pull-up once, before the four USB iterations
    assert_eq!(board.usb_pullup_requests().len(), 9);
    assert!(!board.usb_pullup_requests()[0]);

    Ok(())
}

#[test]
fn it_should_skip_the_sweep_after_a_usb_failure() -> Result {
    let config  = Config::default();
    let d_minus = config.pins.usb_d_minus;

    // Init disables the pull-up once, so the third disable is the one in the
    // second USB iteration.
    let board = Board::new(&config);
    board.pull_after_disables(d_minus, Level::High, 3);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    assert!(!ctx.run_all());

    let report = &ctx.report;
    assert_eq!(report.count("Beginning electrical test"), 1);
    assert_eq!(report.count("Successfully completed"), 0);
    assert_eq!(report.count("Testing data output patterns"), 0);
    assert_eq!(
        report.last().map(|entry| entry.message.as_str()),
        Some("Fault on USB D-, expected High-Z"),
    );

    assert!(board.port_writes().is_empty());
    assert_eq!(board.usb_pullup_requests(), [false, false, true, false]);

    Ok(())
}

#[test]
fn it_should_report_the_failed_stage() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    board.short_usb_data();
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    match ctx.run() {
        Err(StageError {
            stage: Stage::UsbValidation,
            error: Error::Usb(UsbFault::DMinusShortToDPlus),
        }) => (),
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }

    Ok(())
}

#[test]
fn it_should_fail_in_the_sweep_stage() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    board.stick_output(7, Level::Low);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    match ctx.run() {
        Err(StageError {
            stage: Stage::PatternSweep,
            error: Error::OutOfTolerance(_),
        }) => (),
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }
    assert_eq!(ctx.report.count("Successfully completed"), 0);

    Ok(())
}

#[test]
fn it_should_log_hardware_errors() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    board.reject_usb_pullup(0);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.power_on()?);
    assert!(!ctx.run_all());

    let errors: Vec<&str> = ctx.report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0], "Init: Target request failed: Rejected");

    Ok(())
}

#[test]
fn it_should_fail_in_the_init_stage() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    board.reject_usb_pullup(0);
    let mut ctx = board.context(config, Transcript::new());

    match ctx.run() {
        Err(StageError { stage: Stage::Init, error: Error::Hardware(err) }) => {
            assert_eq!(err.node, Node::Target);
        }
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }
    assert_eq!(ctx.report.count("Testing USB connections"), 0);

    Ok(())
}

#[test]
fn it_should_refuse_outputs_past_the_last_target_pin() -> Result {
    let mut config = Config::default();
    config.pins.target_outputs = TargetPin(250);

    let board = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    match ctx.init_target() {
        Err(Error::Hardware(err)) => {
            assert_eq!(err.node, Node::Target);
            assert_eq!(err.message, "No output line 6 after pin 250");
        }
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }

    // Pins 250 to 255 exist, nothing wraps around to pin 0
    let modes: Vec<u8> = board.events()
        .into_iter()
        .filter_map(|event| match event {
            Event::TargetMode { pin, .. } => Some(pin.0),
            _                             => None,
        })
        .collect();
    assert_eq!(modes, [250, 251, 252, 253, 254, 255]);
    assert!(board.usb_pullup_requests().is_empty());

    Ok(())
}

#[test]
fn it_should_power_the_board_around_the_test() -> Result {
    let config = Config::default();
    let pwm    = config.pins.power_pwm;
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.run_powered(false));
    assert_eq!(duty_cycles(&board, pwm), [198, 0]);
    assert_eq!(board.supply_volts(), 0.0);

    Ok(())
}

#[test]
fn it_should_keep_power_if_asked_to() -> Result {
    let config = Config::default();
    let pwm    = config.pins.power_pwm;
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    assert!(ctx.run_powered(true));
    assert_eq!(duty_cycles(&board, pwm), [198]);

    Ok(())
}

#[test]
fn it_should_not_start_the_test_without_power() -> Result {
    let config = Config::default();
    let pwm    = config.pins.power_pwm;
    let vusb   = config.pins.target_vusb;
    let board  = Board::new(&config);
    board.offset_rail(vusb, -1.0);
    let mut ctx = board.context(config, Transcript::new());

    assert!(!ctx.run_powered(false));
    assert_eq!(ctx.report.count("Beginning electrical test"), 0);
    assert_eq!(duty_cycles(&board, pwm), [198, 0]);

    Ok(())
}

#[test]
fn stages_should_follow_each_other() {
    assert_eq!(Stage::Init.next(), Stage::UsbValidation);
    assert_eq!(Stage::UsbValidation.next(), Stage::PatternSweep);
    assert_eq!(Stage::PatternSweep.next(), Stage::Done);
    assert_eq!(Stage::Done.next(), Stage::Done);
}


fn duty_cycles(board: &Board, pwm: protocol::JigPin) -> Vec<u8> {
    board.events()
        .into_iter()
        .filter_map(|event| match event {
            Event::SetPwm { pin, duty, .. } if pin == pwm => Some(duty),
            _                                             => None,
        })
        .collect()
}
