use crate::model::Subject;
use std::collections::BTreeMap;

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 5;

// (abbreviation, name) per year; a subject's id and code are `<ABBR>-<grade>`.
const CORE: &[(&str, &str)] = &[
    ("CAS", "Castellano"),
    ("ILE", "Inglés y otras Lenguas Extranjeras"),
    ("MA", "Matemáticas"),
    ("EF", "Educación Física"),
];
const LOWER_YEARS: &[(&str, &str)] = &[
    ("AP", "Arte y Patrimonio"),
    ("CN", "Ciencias Naturales"),
    ("GHC", "Geografía, Historia y Ciudadanía"),
];
const SCIENCES: &[(&str, &str)] = &[("FI", "Física"), ("QU", "Química"), ("BI", "Biología")];
const EARTH_SCIENCE: &[(&str, &str)] = &[("CT", "Ciencias de la Tierra")];
const HISTORY: &[(&str, &str)] = &[("GHC", "Geografía, Historia y Ciudadanía")];
const SOVEREIGNTY: &[(&str, &str)] = &[("FSN", "Formación para la Soberanía Nacional")];
const GUIDANCE: &[(&str, &str)] = &[
    ("OC", "Orientación y Convivencia"),
    ("GCRP", "Grupos de Creación, Recreación y Producción"),
];

/// Required subjects per grade level, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Curriculum {
    grades: BTreeMap<u8, Vec<Subject>>,
}

impl Curriculum {
    pub fn standard() -> Self {
        let mut grades = BTreeMap::new();
        for grade in MIN_GRADE..=MAX_GRADE {
            let groups: &[&[(&str, &str)]] = match grade {
                1 | 2 => &[CORE, LOWER_YEARS, GUIDANCE],
                3 => &[CORE, SCIENCES, HISTORY, GUIDANCE],
                4 => &[CORE, SCIENCES, HISTORY, SOVEREIGNTY, GUIDANCE],
                _ => &[CORE, SCIENCES, EARTH_SCIENCE, HISTORY, SOVEREIGNTY, GUIDANCE],
            };
            let subjects = groups
                .iter()
                .flat_map(|g| g.iter())
                .map(|(abbr, name)| {
                    let code = format!("{abbr}-{grade}");
                    Subject::new(code.clone(), *name, code)
                })
                .collect();
            grades.insert(grade, subjects);
        }
        Self { grades }
    }

    pub fn from_grades(grades: impl IntoIterator<Item = (u8, Vec<Subject>)>) -> Self {
        Self {
            grades: grades.into_iter().collect(),
        }
    }

    pub fn for_grade(&self, grade_level: u8) -> Option<&[Subject]> {
        self.grades.get(&grade_level).map(Vec::as_slice)
    }

    pub fn grade_levels(&self) -> impl Iterator<Item = u8> + '_ {
        self.grades.keys().copied()
    }
}
