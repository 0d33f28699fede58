//! Tests that need the real test stand
//!
//! Run them with `cargo test -- --ignored`, with a known-good board in the
//! test stand and `test-stand.toml` in the working directory.


use electrical_test::{
    Config,
    TestStand,
    Transcript,
};


#[test]
#[ignore]
fn it_should_pass_a_known_good_board() {
    let test_stand = TestStand::new().unwrap();
    let (_guard, mut ctx) = test_stand
        .into_context(Config::default(), Transcript::new());

    assert!(ctx.run_powered(false));
    assert_eq!(ctx.report.errors().count(), 0);
}

#[test]
#[ignore]
fn it_should_power_a_known_good_board() {
    let test_stand = TestStand::new().unwrap();
    let (_guard, mut ctx) = test_stand
        .into_context(Config::default(), Transcript::new());

    let powered = ctx.power_on().unwrap();
    ctx.power_off().unwrap();

    assert!(powered);
}
