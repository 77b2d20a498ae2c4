// Structural validation of a parsed plan.
// Shape only: no emptiness or length checks on any value.

use serde_json::Value;

const REQUIRED_KEYS: [&str; 3] = ["introduction", "sections", "conclusion"];

/// Pass/fail check of the required plan shape. Never fails itself.
pub fn validate_plan_shape(value: &Value) -> bool {
    check_plan_shape(value).is_ok()
}

/// Same check, reporting the first violated rule.
pub fn check_plan_shape(value: &Value) -> Result<(), String> {
    let root = value
        .as_object()
        .ok_or_else(|| "plan root is not an object".to_string())?;

    for key in REQUIRED_KEYS {
        if !root.contains_key(key) {
            return Err(format!("missing required key '{key}'"));
        }
    }

    let sections = root["sections"]
        .as_array()
        .ok_or_else(|| "'sections' is not a list".to_string())?;

    for (i, section) in sections.iter().enumerate() {
        let section = section
            .as_object()
            .ok_or_else(|| format!("section {i} is not an object"))?;
        if !section.contains_key("title") {
            return Err(format!("section {i} has no 'title'"));
        }
        let subsections = section
            .get("subsections")
            .ok_or_else(|| format!("section {i} has no 'subsections'"))?
            .as_array()
            .ok_or_else(|| format!("section {i} 'subsections' is not a list"))?;

        for (j, subsection) in subsections.iter().enumerate() {
            let subsection = subsection
                .as_object()
                .ok_or_else(|| format!("subsection {i}.{j} is not an object"))?;
            for key in ["title", "description"] {
                if !subsection.contains_key(key) {
                    return Err(format!("subsection {i}.{j} has no '{key}'"));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "introduction": "I",
            "sections": [
                {"title": "S", "subsections": [{"title": "T", "description": "D"}]}
            ],
            "conclusion": "C"
        })
    }

    #[test]
    fn accepts_minimal_plan() {
        assert!(validate_plan_shape(&minimal()));
    }

    #[test]
    fn accepts_empty_values() {
        let plan = json!({
            "introduction": "",
            "sections": [{"title": "", "subsections": [{"title": "", "description": ""}]}],
            "conclusion": ""
        });
        assert!(validate_plan_shape(&plan));
    }

    #[test]
    fn accepts_empty_section_list() {
        let plan = json!({"introduction": "I", "sections": [], "conclusion": "C"});
        assert!(validate_plan_shape(&plan));
    }

    #[test]
    fn rejects_each_missing_required_key() {
        for key in REQUIRED_KEYS {
            let mut plan = minimal();
            plan.as_object_mut().unwrap().remove(key);
            assert!(!validate_plan_shape(&plan), "accepted plan without {key}");
            assert_eq!(
                check_plan_shape(&plan).unwrap_err(),
                format!("missing required key '{key}'")
            );
        }
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(!validate_plan_shape(&json!([1, 2, 3])));
        assert!(!validate_plan_shape(&json!("plan")));
    }

    #[test]
    fn rejects_sections_not_a_list() {
        let plan = json!({"introduction": "I", "sections": {"title": "S"}, "conclusion": "C"});
        assert!(!validate_plan_shape(&plan));
    }

    #[test]
    fn rejects_section_without_subsections() {
        let plan = json!({"introduction": "I", "sections": [{"title": "S"}], "conclusion": "C"});
        assert_eq!(
            check_plan_shape(&plan).unwrap_err(),
            "section 0 has no 'subsections'"
        );
    }

    #[test]
    fn rejects_section_without_title() {
        let plan = json!({"introduction": "I", "sections": [{"subsections": []}], "conclusion": "C"});
        assert!(!validate_plan_shape(&plan));
    }

    #[test]
    fn rejects_subsections_not_a_list() {
        let plan = json!({
            "introduction": "I",
            "sections": [{"title": "S", "subsections": "none"}],
            "conclusion": "C"
        });
        assert!(!validate_plan_shape(&plan));
    }

    #[test]
    fn rejects_subsection_without_description() {
        let plan = json!({
            "introduction": "I",
            "sections": [{"title": "S", "subsections": [{"title": "T"}]}],
            "conclusion": "C"
        });
        assert_eq!(
            check_plan_shape(&plan).unwrap_err(),
            "subsection 0.0 has no 'description'"
        );
    }

    #[test]
    fn rejects_string_section_entries() {
        let plan = json!({"introduction": "I", "sections": ["S"], "conclusion": "C"});
        assert!(!validate_plan_shape(&plan));
    }

    #[test]
    fn exercises_are_not_required() {
        let mut plan = minimal();
        plan["exercises"] = json!("not even a list");
        assert!(validate_plan_shape(&plan));
    }
}
