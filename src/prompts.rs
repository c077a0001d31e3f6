pub const POST: &str = include_str!("../data/prompts/post.txt");
pub const SUGGEST: &str = include_str!("../data/prompts/suggest.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
