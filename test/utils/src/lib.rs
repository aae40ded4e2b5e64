pub fn article_fixture() -> &'static str {
    return r#"
Rust Ownership, Explained

Ownership is a set of rules that govern how a Rust program manages memory.
All programs have to manage the way they use a computer's memory while running.


Some languages have garbage collection that regularly looks for no-longer-used memory as the program runs.
In other languages, the programmer must explicitly allocate and free the memory.
Rust uses a third approach: memory is managed through a system of ownership with a set of rules that the compiler checks.



If any of the rules are violated, the program won't compile.
None of the features of ownership will slow down your program while it's running.
"#
    .trim();
}

pub fn prompt_fixture() -> &'static str {
    return "Summarize \"{{TITLE}}\" ({{URL}}) in {{SELECTED_LANGUAGE}}:\n\n{{CONTENT}}";
}

pub fn unbroken_fixture(len: usize) -> String {
    return "abcdefghijklmnopqrstuvwxyz"
        .chars()
        .cycle()
        .take(len)
        .collect::<String>();
}
