//! Exit status codes for arsync, following the BSD sysexits convention.
//! reference: [SYSEXITS](https://man.freebsd.org/cgi/man.cgi?query=sysexits&apropos=0&sektion=0&manpath=FreeBSD+11.2-stable&arch=default&format=html)

/// value: 1 <br>
/// At least one requested sync failed, or there was nothing to run.
pub const EX_FAILURE: i32 = 1;

/// value: 64 <br>
/// The command was used incorrectly, e.g. a sync name that is not in the configuration.
pub const EX_USAGE: i32 = 64;

/// value: 65 <br>
/// The input data was incorrect in some way, e.g. a variable entry without `=`.
pub const EX_DATAERR: i32 = 65;

/// value: 66 <br>
/// The configuration file did not exist.
pub const EX_NOINPUT: i32 = 66;

/// value: 70 <br>
/// An internal software error has been detected, e.g. the async runtime could not start.
pub const EX_SOFTWARE: i32 = 70;

/// value: 71 <br>
/// An operating system error has been detected, e.g. the working directory is unavailable.
pub const EX_OSERR: i32 = 71;

/// value: 74 <br>
/// An error occurred while reading the configuration file.
pub const EX_IOERR: i32 = 74;

/// value: 78 <br>
/// The configuration file is not valid YAML or does not have the expected shape.
pub const EX_CONFIG: i32 = 78;
