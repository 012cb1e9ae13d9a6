//! gyro-inject - Synthetic gyroscope injection client
//!
//! ## Modes
//!
//! - `socket [address] [port] [x y z]`: stream to the target's socket
//!   server. With `x y z` one sample is sent, otherwise the simulated
//!   waveform runs until Ctrl-C or a send failure.
//! - `file [path] <x> <y> <z> [port]`: write one snapshot document.
//! - `simulate-file [path] [port]`: run the waveform into the snapshot file.
//! - `read [path]`: print the current snapshot.
//! - `listen [bind_address]`: print records received from an injector.
//!
//! `-c/--config <file>` selects a TOML config. Otherwise `gyro-inject.toml`
//! in the working directory is used if present, else built-in defaults.

use gyro_inject::config::{Config, DEFAULT_CONFIG_FILE};
use gyro_inject::error::{Error, Result};
use gyro_inject::signal::setup_ctrl_c_handler;
use gyro_inject::simulation::SimulationDriver;
use gyro_inject::snapshot::{self, SnapshotSink};
use gyro_inject::streaming::{RecordListener, StreamSession};
use gyro_inject::types::Vector3;
use log::{error, info};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Parsed command line
#[derive(Debug)]
enum Command {
    Socket {
        address: String,
        port: u16,
        fixed: Option<Vector3>,
    },
    File {
        path: PathBuf,
        sample: Vector3,
        port: u16,
    },
    SimulateFile {
        path: PathBuf,
        port: u16,
    },
    Read {
        path: PathBuf,
    },
    Listen {
        bind_address: String,
    },
}

fn print_usage(prog: &str, config: &Config) {
    eprintln!("Usage: {} [-c <config.toml>] <mode> [options]", prog);
    eprintln!();
    eprintln!("Modes:");
    eprintln!("  socket [address] [port] [x y z]      Stream to the target socket server.");
    eprintln!("                                       With x y z: send once, else simulate.");
    eprintln!("  file [path] <x> <y> <z> [port]       Write the snapshot file once.");
    eprintln!("  simulate-file [path] [port]          Simulate into the snapshot file.");
    eprintln!("  read [path]                          Print the snapshot file.");
    eprintln!("  listen [bind_address]                Print records sent by an injector.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  address  {}", config.connection.address);
    eprintln!("  port     {}", config.connection.port);
    eprintln!("  path     {}", config.snapshot.path.display());
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} socket 192.168.1.100 12345", prog);
    eprintln!("  {} socket 127.0.0.1 16384 1.0 2.5 -0.5", prog);
    eprintln!("  {} file /path/to/gyro_settings.xml 0.1 0.2 0.3 12345", prog);
    eprintln!("  {} file 0.1 0.2 0.3", prog);
}

/// Pull `-c/--config <path>` out of the argument list.
fn split_config_flag(args: &[String]) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut config_path = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            let path = iter
                .next()
                .ok_or_else(|| Error::InvalidArgument(format!("{} needs a path", arg)))?;
            config_path = Some(PathBuf::from(path));
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((config_path, rest))
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::load(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => Ok(Config::default()),
    }
}

fn parse_f64(value: &str, what: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("{} {:?}: {}", what, value, e)))
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("port {:?}: {}", value, e)))
}

fn parse_vector(values: &[String]) -> Result<Vector3> {
    Ok(Vector3::new(
        parse_f64(&values[0], "x")?,
        parse_f64(&values[1], "y")?,
        parse_f64(&values[2], "z")?,
    ))
}

/// A file-mode argument names a path if it contains `/` or ends in `.xml`
fn looks_like_path(arg: &str) -> bool {
    arg.contains('/') || arg.ends_with(".xml")
}

fn parse_command(args: &[String], config: &Config) -> Result<Command> {
    let Some((mode, rest)) = args.split_first() else {
        return Err(Error::InvalidArgument("missing mode".into()));
    };

    match mode.as_str() {
        "socket" => {
            let address = rest
                .first()
                .cloned()
                .unwrap_or_else(|| config.connection.address.clone());
            let port = match rest.get(1) {
                Some(p) => parse_port(p)?,
                None => config.connection.port,
            };
            let fixed = match rest.len() {
                0..=2 => None,
                5 => Some(parse_vector(&rest[2..5])?),
                _ => {
                    return Err(Error::InvalidArgument(
                        "socket mode takes all of x y z or none".into(),
                    ));
                }
            };
            Ok(Command::Socket {
                address,
                port,
                fixed,
            })
        }
        "file" => {
            let (path, values) = match rest.first() {
                Some(first) if looks_like_path(first) => (PathBuf::from(first), &rest[1..]),
                _ => (config.snapshot.path.clone(), rest),
            };
            if values.len() < 3 || values.len() > 4 {
                return Err(Error::InvalidArgument(
                    "file mode needs x y z and an optional port".into(),
                ));
            }
            let sample = parse_vector(&values[..3])?;
            let port = match values.get(3) {
                Some(p) => parse_port(p)?,
                None => config.snapshot.socket_port,
            };
            Ok(Command::File { path, sample, port })
        }
        "simulate-file" => {
            if rest.len() > 2 {
                return Err(Error::InvalidArgument(
                    "simulate-file takes at most a path and a port".into(),
                ));
            }
            let path = rest
                .first()
                .map(PathBuf::from)
                .unwrap_or_else(|| config.snapshot.path.clone());
            let port = match rest.get(1) {
                Some(p) => parse_port(p)?,
                None => config.snapshot.socket_port,
            };
            Ok(Command::SimulateFile { path, port })
        }
        "read" => {
            if rest.len() > 1 {
                return Err(Error::InvalidArgument("read takes at most a path".into()));
            }
            let path = rest
                .first()
                .map(PathBuf::from)
                .unwrap_or_else(|| config.snapshot.path.clone());
            Ok(Command::Read { path })
        }
        "listen" => {
            if rest.len() > 1 {
                return Err(Error::InvalidArgument(
                    "listen takes at most a bind address".into(),
                ));
            }
            let bind_address = rest
                .first()
                .cloned()
                .unwrap_or_else(|| format!("0.0.0.0:{}", config.connection.port));
            Ok(Command::Listen { bind_address })
        }
        other => Err(Error::InvalidArgument(format!("unknown mode: {}", other))),
    }
}

fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Socket {
            address,
            port,
            fixed: Some(sample),
        } => {
            let mut session = StreamSession::open(&address, port)?;
            info!("Sending one sample: X={}, Y={}, Z={}", sample.x, sample.y, sample.z);
            session.send_vector(sample)?;
            session.disconnect();
            Ok(())
        }
        Command::Socket {
            address,
            port,
            fixed: None,
        } => {
            let mut session = StreamSession::open(&address, port)?;
            // Installed after connecting so Ctrl-C still aborts a hanging connect
            let running = setup_ctrl_c_handler()?;
            info!("Simulating gyroscope stream (Ctrl-C to stop)");
            let mut driver = SimulationDriver::new(&config.simulation, running);
            driver.run(&mut session)?;
            Ok(())
        }
        Command::File { path, sample, port } => {
            snapshot::write(&path, sample, port)?;
            info!("Updated {}", path.display());
            info!(
                "  X={}, Y={}, Z={}, Port={}",
                sample.x, sample.y, sample.z, port
            );
            Ok(())
        }
        Command::SimulateFile { path, port } => {
            let mut sink = SnapshotSink::new(path, port);
            let running = setup_ctrl_c_handler()?;
            info!("Simulating into {} (Ctrl-C to stop)", sink.path().display());
            let mut driver = SimulationDriver::new(&config.simulation, running);
            driver.run(&mut sink)?;
            Ok(())
        }
        Command::Read { path } => {
            let snapshot = snapshot::read(&path)?;
            println!("{}", snapshot);
            Ok(())
        }
        Command::Listen { bind_address } => {
            let listener = RecordListener::bind(&bind_address)?;
            let running = setup_ctrl_c_handler()?;
            info!("Waiting for injector on {} (Ctrl-C to stop)", listener.local_addr()?);
            loop {
                let stats = listener.serve(&running, |sample| println!("{}", sample))?;
                if stats.client.is_none() {
                    return Ok(());
                }
            }
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let prog = args
        .first()
        .map(String::as_str)
        .unwrap_or("gyro-inject")
        .to_string();

    let (config_path, rest) = match split_config_flag(args.get(1..).unwrap_or(&[])) {
        Ok(split) => split,
        Err(e) => {
            eprintln!("{}", e);
            print_usage(&prog, &Config::default());
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let command = match parse_command(&rest, &config) {
        Ok(command) => command,
        Err(e) => {
            error!("{}", e);
            print_usage(&prog, &config);
            return ExitCode::FAILURE;
        }
    };

    match execute(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_flag_anywhere() {
        let (path, rest) =
            split_config_flag(&args(&["socket", "-c", "my.toml", "10.0.0.2"])).unwrap();
        assert_eq!(path, Some(PathBuf::from("my.toml")));
        assert_eq!(rest, args(&["socket", "10.0.0.2"]));

        assert!(split_config_flag(&args(&["read", "--config"])).is_err());
    }

    #[test]
    fn test_socket_defaults() {
        let config = Config::default();
        match parse_command(&args(&["socket"]), &config).unwrap() {
            Command::Socket {
                address,
                port,
                fixed,
            } => {
                assert_eq!(address, "127.0.0.1");
                assert_eq!(port, 16384);
                assert!(fixed.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_socket_send_once() {
        let config = Config::default();
        let command = parse_command(
            &args(&["socket", "127.0.0.1", "16384", "1.0", "2.5", "-0.5"]),
            &config,
        )
        .unwrap();
        match command {
            Command::Socket { fixed, .. } => {
                assert_eq!(fixed, Some(Vector3::new(1.0, 2.5, -0.5)))
            }
            other => panic!("unexpected {:?}", other),
        }

        // Partial vectors are rejected
        assert!(parse_command(&args(&["socket", "127.0.0.1", "1", "1.0"]), &config).is_err());
        assert!(parse_command(&args(&["socket", "127.0.0.1", "x"]), &config).is_err());
    }

    #[test]
    fn test_file_path_detection() {
        let config = Config::default();
        match parse_command(&args(&["file", "0.1", "0.2", "0.3"]), &config).unwrap() {
            Command::File { path, sample, port } => {
                assert_eq!(path, config.snapshot.path);
                assert_eq!(sample, Vector3::new(0.1, 0.2, 0.3));
                assert_eq!(port, 16384);
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_command(
            &args(&["file", "settings.xml", "1", "2", "3", "12345"]),
            &config,
        )
        .unwrap()
        {
            Command::File { path, port, .. } => {
                assert_eq!(path, PathBuf::from("settings.xml"));
                assert_eq!(port, 12345);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(parse_command(&args(&["file", "/tmp/a.xml", "1", "2"]), &config).is_err());
    }

    #[test]
    fn test_unknown_mode_and_empty() {
        let config = Config::default();
        assert!(parse_command(&args(&["teleport"]), &config).is_err());
        assert!(parse_command(&[], &config).is_err());
    }

    #[test]
    fn test_listen_default_bind() {
        let config = Config::default();
        match parse_command(&args(&["listen"]), &config).unwrap() {
            Command::Listen { bind_address } => assert_eq!(bind_address, "0.0.0.0:16384"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_failed_connect_leaves_ctrl_c_default() {
        // Bind then drop to get a port nobody is listening on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let command = Command::Socket {
            address: "127.0.0.1".to_string(),
            port,
            fixed: None,
        };

        let result = execute(command, &Config::default());
        assert!(matches!(result, Err(Error::Connection { .. })));
        // No handler was installed, so this one is the first
        assert!(setup_ctrl_c_handler().is_ok());
    }
}
