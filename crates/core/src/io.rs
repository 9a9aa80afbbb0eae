//! Reading and writing object programs as `.obj` JSON files.

use std::fs;
use std::path::Path;

use crate::error::ObjectIoError;
use crate::program::ObjectProgram;

/// Serialize `program` as pretty-printed JSON and write it to `path`.
pub fn save(program: &ObjectProgram, path: &Path) -> Result<(), ObjectIoError> {
    let json = program
        .to_json_pretty()
        .map_err(|source| ObjectIoError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, json).map_err(|source| ObjectIoError::Io { path: path.to_path_buf(), source })
}

/// Read and parse an object program from `path`.
pub fn load(path: &Path) -> Result<ObjectProgram, ObjectIoError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ObjectIoError::Io { path: path.to_path_buf(), source })?;
    ObjectProgram::from_json(&text)
        .map_err(|source| ObjectIoError::Json { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ConstantValue, Quadruple};
    use crate::program::Op;

    #[test]
    fn round_trip_preserves_quadruples_and_constants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.obj");

        let mut prog = ObjectProgram {
            program_name: "P".to_string(),
            ..Default::default()
        };
        prog.quadruples.push(Quadruple::new(Op::Plus, 7000i64, 7001i64, 5000i64));
        prog.constants.insert(7000, ConstantValue::Int(2));
        prog.constants.insert(7001, ConstantValue::Int(3));

        save(&prog, &path).unwrap();
        let back = load(&path).unwrap();

        assert_eq!(back.program_name, "P");
        assert_eq!(back.quadruples, prog.quadruples);
        assert_eq!(back.constants.get(&7000), Some(&ConstantValue::Int(2)));
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let err = load(Path::new("/nonexistent/path/to/nothing.obj")).unwrap_err();
        assert!(matches!(err, ObjectIoError::Io { .. }));
    }
}
