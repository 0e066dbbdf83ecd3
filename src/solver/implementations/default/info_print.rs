use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::{
    algebra::*,
    solver::core::cones::{SupportedConeAsTag, SupportedConeTag},
};
use std::io::Write;

use super::*;
use crate::solver::core::{
    cones::{CompositeCone, Cone},
    traits::InfoPrint,
    SolverStatus,
};
use std::time::Duration;

impl<T> ConfigurablePrintTarget for DefaultInfo<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

const RULE: &str = "--------------------------------------------------------------------";

impl<T> InfoPrint<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "{}", RULE)?;
        writeln!(
            out,
            "           embedqp v{}  -  embedded ADMM QP / SOCP solver",
            crate::VERSION
        )?;
        writeln!(out, "{}", RULE)?;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", data.n)?;
        writeln!(out, "  constraints   = {}", data.m)?;
        writeln!(out, "  nnz(P)        = {}", data.P.nnz())?;
        writeln!(out, "  nnz(A)        = {}", data.A.nnz())?;
        writeln!(out, "  cones (total) = {}", cones.len())?;

        _print_conedims_by_type(out, cones, SupportedConeTag::ZeroCone)?;
        _print_conedims_by_type(out, cones, SupportedConeTag::NonnegativeCone)?;
        _print_conedims_by_type(out, cones, SupportedConeTag::SecondOrderCone)?;

        if !data.parameters.is_empty() {
            writeln!(out, "  parameters    = {}", data.parameters.len())?;
        }

        writeln!(out,)?;

        self.print_settings(settings)?;

        std::io::Result::Ok(())
    }

    fn print_status_header(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        //print a subheader for the iterations info
        write!(out, "iter    ")?;
        write!(out, "objective    ")?;
        write!(out, "pres      ")?;
        write!(out, "dres      ")?;
        write!(out, "rho       ")?;
        write!(out, "time")?;
        writeln!(out,)?;
        writeln!(out, "{}", RULE)?;
        out.flush()?;
        std::io::Result::Ok(())
    }

    fn print_status(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        // first iterate, then every tenth, then the last
        let iter = self.iterations;
        let last = self.status != SolverStatus::Iterating || iter >= settings.max_iter;
        if !(iter <= 1 || iter % 10 == 0 || last) {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>4}  ", iter)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_primal))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_primal))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_dual))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.rho))?;
        write!(out, "{:.2?}", Duration::from_secs_f64(self.solve_time))?;
        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    fn print_footer(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "{}", RULE)?;

        writeln!(out, "Terminated with status = {}", self.status)?;
        if self.status == SolverStatus::Solved {
            writeln!(out, "solution polishing: {}", _polish_result(self.polished))?;
        }
        writeln!(out, "iterations = {}", self.iterations)?;
        writeln!(
            out,
            "objective = {}",
            expformat!("{:+.6e}", self.cost_primal)
        )?;

        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )?;

        out.flush()?;
        std::io::Result::Ok(())
    }
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    fn print_settings(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        let out = &mut self.stream;

        let set = settings;

        writeln!(out, "settings:")?;

        writeln!(
            out,
            "  linear algebra: direct / qdldl, precision: {} bit",
            _get_precision_string::<T>()
        )?;

        let time_lim_str = {
            if set.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", set.time_limit)
            }
        };
        writeln!(
            out,
            "  max iter = {}, time limit = {},  warm start = {}",
            set.max_iter,
            time_lim_str,
            _bool_on_off(set.warm_start)
        )?;

        writeln!(
            out,
            "  eps_abs = {:.1e}, eps_rel = {:.1e},",
            set.eps_abs, set.eps_rel
        )?;

        writeln!(
            out,
            "  eps_prim_inf = {:.1e}, eps_dual_inf = {:.1e}",
            set.eps_prim_inf, set.eps_dual_inf
        )?;

        writeln!(
            out,
            "  rho = {:.2e}, sigma = {:.2e}, alpha = {:.2}",
            set.rho, set.sigma, set.alpha
        )?;

        writeln!(
            out,
            "  adaptive rho: {}, interval = {}, tolerance = {:.1}",
            _bool_on_off(set.adaptive_rho),
            set.adaptive_rho_interval,
            set.adaptive_rho_tolerance
        )?;

        writeln!(
            out,
            "  polish: {}, δ = {:.1e}, refine iter = {}",
            _bool_on_off(set.polish),
            set.polish_delta,
            set.polish_refine_iter
        )?;

        writeln!(
            out,
            "  equilibrate: {}, min_scale = {:.1e}, max_scale = {:.1e}",
            _bool_on_off(set.equilibrate_enable),
            set.equilibrate_min_scaling,
            set.equilibrate_max_scaling
        )?;

        writeln!(
            out,
            "               max iter = {}",
            set.equilibrate_max_iter,
        )?;

        writeln!(out,)?;

        std::io::Result::Ok(())
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _polish_result(v: bool) -> &'static str {
    match v {
        true => "successful",
        false => "unsuccessful",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

fn _print_conedims_by_type<T: FloatT>(
    out: &mut PrintTarget,
    cones: &CompositeCone<T>,
    conetag: SupportedConeTag,
) -> std::io::Result<()> {
    let maxlistlen = 5;

    let count = cones.get_type_count(conetag);

    //skip if there are none of this type
    if count == 0 {
        return std::io::Result::Ok(());
    }

    // drops trailing "Cone" part of name
    let name = conetag.as_str();
    let name = &name[0..name.len() - 4];
    let name = format!("{name:>11}");

    let nvars: Vec<usize> = cones
        .iter()
        .filter(|cone| cone.as_tag() == conetag)
        .map(|cone| cone.numel())
        .collect();

    write!(out, "    : {name} = {count}, ")?;

    let (last, rest) = match nvars.split_last() {
        Some(split) => split,
        None => return std::io::Result::Ok(()),
    };

    if count == 1 {
        write!(out, " numel = {last}")?;
    } else if count <= maxlistlen {
        //print them all
        write!(out, " numel = (")?;
        for nvar in rest {
            write!(out, "{nvar},")?;
        }
        write!(out, "{last})")?;
    } else {
        // print first (maxlistlen-1) and the final one
        write!(out, " numel = (")?;
        for nvar in rest.iter().take(maxlistlen - 1) {
            write!(out, "{nvar},")?;
        }
        write!(out, "...,{last})")?;
    }

    writeln!(out,)?;

    std::io::Result::Ok(())
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat("1.5e3".to_string()), "1.5e+03");
    assert_eq!(_exp_str_reformat("1.5e-3".to_string()), "1.5e-03");
    assert_eq!(_exp_str_reformat("-2.0e-12".to_string()), "-2.0e-12");
    assert_eq!(_exp_str_reformat("inf".to_string()), "inf");
}

#[test]
fn test_print_to_buffer() {
    use crate::solver::core::cones::SupportedConeT::*;
    use crate::solver::core::traits::InfoPrint;

    let P = CscMatrix::<f64>::identity(2);
    let A = CscMatrix::<f64>::identity(2);
    let cones = CompositeCone::new(&[NonnegativeConeT(1), NonnegativeConeT(1)]);
    let data = DefaultProblemData::new(&P, &[1., 1.], &A, &[1., 1.], &cones, 1e20);
    let settings = DefaultSettings::default();

    let mut info = DefaultInfo::<f64>::new();
    info.print_to_buffer();
    info.print_configuration(&settings, &data, &cones).unwrap();
    info.print_status_header(&settings).unwrap();
    info.print_footer(&settings).unwrap();

    let text = info.get_print_buffer().unwrap();
    assert!(text.contains("variables     = 2"));
    assert!(text.contains("Nonnegative = 2,  numel = (1,1)"));
    assert!(text.contains("Terminated with status = Unsolved"));
}
