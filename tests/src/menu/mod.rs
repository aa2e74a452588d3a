#[cfg(test)]
mod mediator;
#[cfg(test)]
mod tooltips;
