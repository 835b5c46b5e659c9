
#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod announcement_tests;
#[cfg(test)]
mod publish_tests;
#[cfg(test)]
mod site_tests;
#[cfg(test)]
mod visitor_tests;
