use electrical_test::{
    Config,
    Error,
    Node,
    Result,
    Transcript,
    UsbFault,
    sim::{
        Board,
        Event,
        SimJig,
        SimTarget,
    },
    usb::usb_steps,
};
use protocol::pin::Level;


#[test]
fn it_should_pass_a_healthy_connector_in_four_iterations() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    ctx.test_usb_connections()?;

    assert_eq!(
        board.usb_pullup_requests(),
        [false, true, false, true, false, true, false, true],
    );
    assert_eq!(ctx.report.count("Testing USB connections"), 1);
    assert_eq!(ctx.report.errors().count(), 0);

    Ok(())
}

#[test]
fn it_should_only_observe_digital_lines() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());

    ctx.test_usb_connections()?;

    let analog_reads = board.events()
        .into_iter()
        .filter(|event| matches!(event, Event::ReadAnalog { .. }))
        .count();
    assert_eq!(analog_reads, 0);

    Ok(())
}

#[test]
fn it_should_run_the_steps_in_order() {
    let names: Vec<&str> = usb_steps::<SimJig, SimTarget, Transcript>()
        .iter()
        .map(|step| step.name)
        .collect();

    assert_eq!(
        names,
        [
            "disable USB pull-up",
            "USB grounds",
            "D- high-Z",
            "D+ high-Z",
            "enable USB pull-up",
            "D+ pulled up, D- high-Z",
        ],
    );
}

#[test]
fn it_should_detect_a_broken_shield_ground() -> Result {
    let config = Config::default();
    let shield = config.pins.usb_shield_ground;

    let board = Board::new(&config);
    board.break_ground(shield);

    expect_fault(&board, config, UsbFault::ShieldGround,
        "Faulty USB shield ground")?;
    assert_eq!(board.usb_pullup_requests(), [false]);

    Ok(())
}

#[test]
fn it_should_detect_a_broken_signal_ground() -> Result {
    let config = Config::default();
    let signal = config.pins.usb_signal_ground;

    let board = Board::new(&config);
    board.break_ground(signal);

    expect_fault(&board, config, UsbFault::SignalGround,
        "Faulty USB signal ground")
}

#[test]
fn it_should_detect_a_pulled_d_minus() -> Result {
    let config  = Config::default();
    let d_minus = config.pins.usb_d_minus;

    let board = Board::new(&config);
    board.pull(d_minus, Level::Low);

    expect_fault(&board, config, UsbFault::DMinusNotHighZ,
        "Fault on USB D-, expected High-Z")
}

#[test]
fn it_should_detect_a_pulled_d_plus() -> Result {
    let config = Config::default();
    let d_plus = config.pins.usb_d_plus;

    let board = Board::new(&config);
    board.pull(d_plus, Level::Low);

    expect_fault(&board, config, UsbFault::DPlusNotHighZ,
        "Fault on USB D+, expected High-Z")
}

#[test]
fn it_should_detect_a_missing_pull_up() -> Result {
    let config = Config::default();

    let board = Board::new(&config);
    board.break_usb_pullup();

    expect_fault(&board, config, UsbFault::DPlusNoPullUp,
        "Fault on USB D+, no pull-up found")?;
    assert_eq!(board.usb_pullup_requests(), [false, true]);

    Ok(())
}

#[test]
fn it_should_detect_a_short_between_d_plus_and_d_minus() -> Result {
    let config = Config::default();

    let board = Board::new(&config);
    board.short_usb_data();

    expect_fault(&board, config, UsbFault::DMinusShortToDPlus,
        "Fault on USB D-, expected High-Z. Possible short to D+")
}

#[test]
fn it_should_abort_in_a_later_iteration() -> Result {
    let config  = Config::default();
    let d_minus = config.pins.usb_d_minus;

    // Starts pulling D- once the second iteration has disabled the pull-up
    let board = Board::new(&config);
    board.pull_after_disables(d_minus, Level::High, 2);

    expect_fault(&board, config, UsbFault::DMinusNotHighZ,
        "Fault on USB D-, expected High-Z")?;
    assert_eq!(board.usb_pullup_requests(), [false, true, false]);

    Ok(())
}

#[test]
fn it_should_abort_if_the_target_rejects_the_pull_up_request() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    board.reject_usb_pullup(4);
    let mut ctx = board.context(config, Transcript::new());

    match ctx.test_usb_connections() {
        Err(Error::Hardware(err)) => assert_eq!(err.node, Node::Target),
        result                    => panic!("Unexpected result: {:?}", result),
    }
    assert_eq!(board.usb_pullup_requests().len(), 5);

    Ok(())
}


fn expect_fault(board: &Board, config: Config, fault: UsbFault, message: &str)
    -> Result
{
    let mut ctx = board.context(config, Transcript::new());

    match ctx.test_usb_connections() {
        Err(Error::Usb(f)) => assert_eq!(f, fault),
        result             => panic!("Unexpected result: {:?}", result),
    }

    let errors: Vec<&str> = ctx.report.errors().collect();
    assert_eq!(errors, [message]);

    Ok(())
}
