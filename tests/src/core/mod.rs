#[cfg(test)]
mod decoder;
#[cfg(test)]
mod rewrite;
