#[cfg(test)]
mod common;


#[cfg(test)]
mod test_domain_expansion;
