use marketplace::model::Salt;

/// Salt subcommand entrypoint.
pub(crate) fn salt() {
    println!("{}", Salt::random());
}
