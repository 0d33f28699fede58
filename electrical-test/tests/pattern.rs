use electrical_test::{
    Config,
    Context,
    Error,
    Node,
    Result,
    Transcript,
    pattern::SWEEP,
    sim::{
        Board,
        Event,
        SimJig,
        SimTarget,
    },
};
use protocol::{
    JigPin,
    pin::Level,
};


type SimContext = Context<SimJig, SimTarget, Transcript>;


#[test]
fn it_should_sweep_all_patterns_in_order() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());
    prepare(&mut ctx)?;

    ctx.test_all_patterns()?;

    assert_eq!(board.port_writes(), SWEEP);
    assert_eq!(board.port(), 0xff);
    assert_eq!(ctx.report.count("Testing data output patterns"), 1);
    assert_eq!(ctx.report.errors().count(), 0);

    Ok(())
}

#[test]
fn it_should_check_rails_before_output_lines() -> Result {
    let config = Config::default();
    let pins   = config.pins;
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());
    prepare(&mut ctx)?;

    ctx.test_pattern(0b1010_0101)?;

    let mut expected = vec![pins.target_33v, pins.target_vusb];
    expected.extend_from_slice(&pins.sense);
    assert_eq!(analog_reads_after_first_write(&board), expected);

    Ok(())
}

#[test]
fn it_should_abort_the_sweep_on_a_rejected_write() -> Result {
    let config = Config::default();
    let board  = Board::new(&config);
    board.reject_write_port(5);
    let mut ctx = board.context(config, Transcript::new());
    prepare(&mut ctx)?;

    match ctx.test_all_patterns() {
        Err(Error::Hardware(err)) => assert_eq!(err.node, Node::Target),
        result                    => panic!("Unexpected result: {:?}", result),
    }

    assert_eq!(board.port_writes(), SWEEP[..6]);
    assert_eq!(ctx.report.count("Analog value"), 0);

    Ok(())
}

#[test]
fn it_should_detect_an_output_stuck_low() -> Result {
    let config = Config::default();
    let sense  = config.pins.sense;
    let board  = Board::new(&config);
    board.stick_output(3, Level::Low);
    let mut ctx = board.context(config, Transcript::new());
    prepare(&mut ctx)?;

    match ctx.test_all_patterns() {
        Err(Error::OutOfTolerance(measurement)) => {
            assert_eq!(measurement.pin, sense[3]);
        }
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }

    // All off passes, all on fails
    assert_eq!(board.port_writes(), [0x00, 0xff]);
    assert_eq!(
        ctx.report.last().map(|entry| entry.message.as_str()),
        Some(
            "Analog value 3 outside reference range! \
            value = 0.00v, ref = 5.00v +/- 0.30v"
        ),
    );

    Ok(())
}

#[test]
fn it_should_detect_an_output_stuck_high() -> Result {
    let config = Config::default();
    let sense  = config.pins.sense;
    let board  = Board::new(&config);
    board.stick_output(5, Level::High);
    let mut ctx = board.context(config, Transcript::new());
    prepare(&mut ctx)?;

    match ctx.test_all_patterns() {
        Err(Error::OutOfTolerance(measurement)) => {
            assert_eq!(measurement.pin, sense[5]);
        }
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }
    assert_eq!(board.port_writes(), [0x00]);

    Ok(())
}

#[test]
fn it_should_stop_at_a_rail_excursion() -> Result {
    let config = Config::default();
    let rail   = config.pins.target_33v;
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());
    prepare(&mut ctx)?;

    board.offset_rail(rail, 0.5);

    assert!(ctx.test_pattern(0x00).is_err());
    assert_eq!(analog_reads_after_first_write(&board), [rail]);

    Ok(())
}

#[test]
fn it_should_fail_on_an_unpowered_board() -> Result {
    let config = Config::default();
    let rail   = config.pins.target_33v;
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());
    ctx.init_target()?;

    match ctx.test_pattern(0x00) {
        Err(Error::OutOfTolerance(measurement)) => {
            assert_eq!(measurement.pin, rail);
            assert_eq!(measurement.volts, 0.0);
        }
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }

    Ok(())
}

#[test]
fn it_should_fail_if_outputs_are_not_enabled() -> Result {
    let config = Config::default();
    let sense  = config.pins.sense;
    let board  = Board::new(&config);
    let mut ctx = board.context(config, Transcript::new());
    assert!(ctx.power_on()?);

    ctx.test_pattern(0x00)?;
    match ctx.test_pattern(0x01) {
        Err(Error::OutOfTolerance(measurement)) => {
            assert_eq!(measurement.pin, sense[0]);
        }
        result => {
            panic!("Unexpected result: {:?}", result);
        }
    }

    Ok(())
}


#[test]
#[should_panic(expected = "No output line 8")]
fn it_should_only_stick_lines_of_the_port() {
    let board = Board::new(&Config::default());
    board.stick_output(8, Level::High);
}


fn prepare(ctx: &mut SimContext) -> Result {
    assert!(ctx.power_on()?);
    ctx.init_target()
}

fn analog_reads_after_first_write(board: &Board) -> Vec<JigPin> {
    board.events()
        .into_iter()
        .skip_while(|event| !matches!(event, Event::WritePort { .. }))
        .filter_map(|event| match event {
            Event::ReadAnalog { pin, .. } => Some(pin),
            _                             => None,
        })
        .collect()
}
