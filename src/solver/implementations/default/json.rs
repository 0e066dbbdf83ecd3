use super::*;
use crate::{
    algebra::*,
    solver::core::{cones::SupportedConeT, SolverJSONReadWrite},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The problem as originally posed, i.e. without equilibration,
// together with everything needed to rebuild the solver.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub b: Vec<T>,
    pub cones: Vec<SupportedConeT>,
    pub settings: DefaultSettings<T>,
    #[serde(default)]
    pub parameters: ParameterSchema<T>,
}

impl<T> SolverJSONReadWrite for DefaultSolver<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let (P, q, A, b) = self.data.unscaled();

        let mut json_data = JsonProblemData {
            P,
            q,
            A,
            b,
            cones: self.cones.cone_types(),
            settings: self.settings.clone(),
            parameters: self.data.parameters.clone(),
        };

        // sanitize settings to remove values that
        // can't be serialized, i.e. infs
        sanitize_settings(&mut json_data.settings);

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        // restore sanitized settings to their (likely) original values
        desanitize_settings(&mut json_data.settings);

        let JsonProblemData {
            P,
            q,
            A,
            b,
            cones,
            settings,
            parameters,
        } = json_data;

        Self::new_with_parameters(&P, &q, &A, &b, &cones, settings, parameters)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn sanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::INFINITY {
        settings.time_limit = f64::MAX;
    }
}

fn desanitize_settings<T: FloatT>(settings: &mut DefaultSettings<T>) {
    if settings.time_limit == f64::MAX {
        settings.time_limit = f64::INFINITY;
    }
}

#[test]
fn test_json_io() {
    use crate::solver::core::ADMMSolver;
    use std::io::{Seek, SeekFrom};

    let P = CscMatrix::from(&[[2.0]]);
    let q = [1.0];
    let A = CscMatrix::from(&[[-1.0]]);
    let b = [-2.0];
    let cones = [SupportedConeT::NonnegativeConeT(1)];

    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let params = ParameterSchema::new(vec![Parameter::new(
        "bound",
        ParameterShape::Scalar,
        DataField::b,
        vec![0],
    )]);

    let mut solver =
        DefaultSolver::<f64>::new_with_parameters(&P, &q, &A, &b, &cones, settings, params)
            .unwrap();
    solver.solve();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    solver.write_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = DefaultSolver::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(solver2.settings.time_limit, f64::INFINITY);
    assert!(solver2.parameters().get("bound").is_some());

    // rescaling on read can perturb the data in the last bits
    solver2.solve();
    assert_eq!(solver2.solution.status, solver.solution.status);
    assert!((solver.solution.x[0] - solver2.solution.x[0]).abs() < 1e-8);
}
