extern crate clap;
extern crate env_logger;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate spinrdm;

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process;
use std::str::FromStr;
use spinrdm::basis::Scheme;
use spinrdm::cg;
use spinrdm::op::{Vector, VectorMut};
use spinrdm::sup::{Conds, Sup};
use spinrdm::tpm::Tpm;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunConf {
    conds: Conds,
    cg: cg::Conf,
}

fn parse_value<T>(name: &str, value: &str) -> Result<T, String>
    where T: FromStr,
          T::Err: fmt::Display,
{
    value.parse()
        .map_err(|e| format!("invalid --{} {:?}: {}", name, value, e))
}

/// Parse the value of an argument, exiting with a message if it is invalid.
fn parse_arg<T>(matches: &clap::ArgMatches, name: &str) -> T
    where T: FromStr,
          T::Err: fmt::Display,
{
    let value = matches.value_of(name).unwrap_or_default();
    parse_value(name, value).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1)
    })
}

fn main() {
    env_logger::init();
    let matches = clap::App::new(env!("CARGO_PKG_NAME"))
        .args_from_usage("--orbs=<orbs> 'Number of spin orbitals (even)'")
        .args_from_usage("--particles=<particles> 'Number of particles'")
        .args_from_usage("[--model=<model>] 'Model Hamiltonian (hubbard or pairing)'")
        .args_from_usage("[--coupling=<coupling>] 'On-site repulsion U or pairing strength g'")
        .args_from_usage("[--input=<input>] 'File containing two-particle matrix elements of the Hamiltonian'")
        .group(clap::ArgGroup::with_name("hamiltonian")
               .args(&["model", "input"])
               .required(true))
        .args_from_usage("[--conf=<conf>] 'YAML file with conditions and solver settings'")
        .args_from_usage("[--dump=<dump>] 'Write the solution to this file'")
        .get_matches();

    let num_orbs: usize = parse_arg(&matches, "orbs");
    println!("num_orbs: {}", num_orbs);
    let num_particles: usize = parse_arg(&matches, "particles");
    println!("num_particles: {}", num_particles);
    let conf: RunConf = match matches.value_of("conf") {
        Some(path) => {
            let file = File::open(path).unwrap_or_else(|e| {
                eprintln!("cannot open {}: {}", path, e);
                process::exit(1)
            });
            serde_yaml::from_reader(file).unwrap_or_else(|e| {
                eprintln!("cannot parse {}: {}", path, e);
                process::exit(1)
            })
        }
        None => Default::default(),
    };
    println!("conds: {:?}", conf.conds);

    let scheme = Scheme::new(num_orbs).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1)
    });
    let mut ham = Tpm::new(&scheme, num_particles).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1)
    });
    if let Some(input) = matches.value_of("input") {
        println!("input: {}", input);
        ham.load_sp(Path::new(input)).unwrap_or_else(|e| {
            eprintln!("cannot read {}: {}", input, e);
            process::exit(1)
        });
    } else {
        let model = matches.value_of("model").unwrap_or_default();
        let coupling: f64 = match matches.value_of("coupling") {
            Some(_) => parse_arg(&matches, "coupling"),
            None => 1.0,
        };
        println!("model: {}", model);
        println!("coupling: {}", coupling);
        match model {
            "hubbard" => ham.hubbard(coupling),
            "pairing" => ham.sp_pairing(coupling),
            _ => {
                eprintln!("unknown model: {}", model);
                process::exit(1)
            }
        }
    }

    let mut tpm = ham.zeros_like();
    tpm.init();
    println!("trace: {}", tpm.trace());
    println!("spin: {}", tpm.spin());
    println!("energy: {}", ham.ddot(&tpm));

    let mut sup = Sup::new(&scheme, num_particles, conf.conds)
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1)
        });
    sup.fill(&tpm);
    let mut rhs = ham.clone();
    rhs.proj_tr();
    let mut delta = ham.zeros_like();
    let iterations = delta.solve(&rhs, &sup, &conf.cg).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1)
    });
    println!("iterations: {}", iterations);
    let mut residual = delta.zeros_like();
    residual.hessian(&delta, &sup);
    residual.daxpy(-1.0, &rhs);
    println!("residual: {:e}", residual.ddot(&residual).sqrt());
    println!("step_trace: {:e}", delta.trace());
    println!("step_energy: {}", ham.ddot(&delta));

    if let Some(dump) = matches.value_of("dump") {
        File::create(dump)
            .and_then(|f| delta.uncouple(&mut BufWriter::new(f)))
            .unwrap_or_else(|e| {
                eprintln!("cannot write {}: {}", dump, e);
                process::exit(1)
            });
        println!("dump: {}", dump);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<usize>("orbs", "8"), Ok(8));
        assert_eq!(parse_value::<f64>("coupling", "-0.5"), Ok(-0.5));
        let err = parse_value::<usize>("orbs", "eight").unwrap_err();
        assert!(err.starts_with("invalid --orbs \"eight\": "), "{}", err);
        assert!(parse_value::<usize>("particles", "-2").is_err());
        assert!(parse_value::<f64>("coupling", "").is_err());
    }
}
