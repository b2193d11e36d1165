mod test_cache_basic;
mod test_intervention_basic;
mod test_report_basic;
